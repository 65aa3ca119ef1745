//! Retrieval-and-fallback decision procedure.
//!
//! [`LocalRetriever`] scores the nearest chunks for a question,
//! [`AnswerRouter`] trusts that candidate when its score reaches the threshold
//! and otherwise defers to [`ExternalFallback`].

pub mod fallback;
pub mod retriever;
pub mod router;

pub use fallback::{ExternalFallback, FallbackAnswer, FallbackError};
pub use retriever::LocalRetriever;
pub use router::AnswerRouter;
