use std::sync::Arc;

use crate::types::SearchResult;

pub trait Embedder: Send + Sync {
    /// Stable identity of the embedding function, persisted next to the index.
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Read-only nearest-neighbour lookup over indexed chunks.
///
/// Implementations return at most `k` results ordered by increasing distance.
pub trait VectorIndex: Send + Sync {
    fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchResult>>;
}

/// An encyclopedic search + summary service.
pub trait KnowledgeSource: Send + Sync {
    /// Candidate page titles, best match first.
    fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<String>>;
    fn summarize(&self, title: &str, max_sentences: usize) -> anyhow::Result<String>;
}

impl<T: VectorIndex + ?Sized> VectorIndex for &T {
    fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchResult>> { (**self).search(query, k) }
}

impl<T: VectorIndex + ?Sized> VectorIndex for Arc<T> {
    fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchResult>> { (**self).search(query, k) }
}

impl<T: KnowledgeSource + ?Sized> KnowledgeSource for &T {
    fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<String>> { (**self).search(query, max_results) }
    fn summarize(&self, title: &str, max_sentences: usize) -> anyhow::Result<String> { (**self).summarize(title, max_sentences) }
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn model_id(&self) -> &str { (**self).model_id() }
    fn dim(&self) -> usize { (**self).dim() }
    fn max_len(&self) -> usize { (**self).max_len() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> { (**self).embed_batch(texts) }
}
