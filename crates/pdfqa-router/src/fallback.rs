use thiserror::Error;
use tracing::{debug, warn};

use pdfqa_core::config::WikiSettings;
use pdfqa_core::traits::KnowledgeSource;

pub const NOT_FOUND_MESSAGE: &str = "No relevant answer found on Wikipedia.";
pub const LOOKUP_FAILED_MESSAGE: &str = "Wikipedia lookup failed.";

#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("external search failed: {0}")]
    Search(#[source] anyhow::Error),
    #[error("summary of '{title}' failed: {source}")]
    Summary { title: String, #[source] source: anyhow::Error },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FallbackAnswer {
    Found { title: String, summary: String },
    NotFound,
}

impl FallbackAnswer {
    pub fn to_text(&self) -> String {
        match self {
            FallbackAnswer::Found { title, summary } => format!("From Wikipedia ({title}):\n\n{summary}"),
            FallbackAnswer::NotFound => NOT_FOUND_MESSAGE.to_string(),
        }
    }
}

/// Search-then-summarize lookup against an external knowledge source.
pub struct ExternalFallback<K> {
    source: K,
    max_results: usize,
    sentences: usize,
}

impl<K: KnowledgeSource> ExternalFallback<K> {
    pub fn new(source: K, settings: &WikiSettings) -> Self {
        Self { source, max_results: settings.max_results, sentences: settings.sentences }
    }

    /// Summarize the best-ranked title; `NotFound` if the search has no titles.
    pub fn lookup(&self, question: &str) -> Result<FallbackAnswer, FallbackError> {
        let titles = self.source.search(question, self.max_results).map_err(FallbackError::Search)?;
        let Some(title) = titles.into_iter().next() else {
            debug!(question, "external search returned no titles");
            return Ok(FallbackAnswer::NotFound);
        };
        let summary = self.source.summarize(&title, self.sentences).map_err(|source| FallbackError::Summary { title: title.clone(), source })?;
        Ok(FallbackAnswer::Found { title, summary })
    }

    /// Never fails: errors become [`LOOKUP_FAILED_MESSAGE`].
    pub fn answer_text(&self, question: &str) -> String {
        match self.lookup(question) {
            Ok(answer) => answer.to_text(),
            Err(e) => {
                warn!(error = %e, "external fallback failed");
                LOOKUP_FAILED_MESSAGE.to_string()
            }
        }
    }
}
