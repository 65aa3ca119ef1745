//! LanceDB-backed chunk index: build it once with [`LanceDbIndexer`], then
//! serve similarity queries through [`LanceVectorIndex`].

pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use search::LanceVectorIndex;
pub use writer::LanceDbIndexer;
