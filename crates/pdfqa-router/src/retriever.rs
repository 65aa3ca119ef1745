use tracing::debug;

use pdfqa_core::config::RetrievalSettings;
use pdfqa_core::score::normalize_distance;
use pdfqa_core::traits::VectorIndex;
use pdfqa_core::types::{AnswerCandidate, SearchResult};

pub const TRUNCATION_MARKER: &str = "....";

/// Turns the top-k chunks for a question into one scored answer candidate.
pub struct LocalRetriever<I> {
    index: I,
    top_k: usize,
    max_chars: usize,
}

impl<I: VectorIndex> LocalRetriever<I> {
    pub fn new(index: I, settings: &RetrievalSettings) -> Self {
        Self { index, top_k: settings.top_k, max_chars: settings.max_answer_chars }
    }

    pub fn top_k(&self) -> usize { self.top_k }

    pub fn index(&self) -> &I { &self.index }

    /// `Ok(None)` when the index has nothing for the question (score 0.0).
    pub fn retrieve(&self, question: &str) -> anyhow::Result<Option<AnswerCandidate>> {
        let results = self.index.search(question, self.top_k)?;
        let candidate = assemble_candidate(&results, self.max_chars);
        debug!(hits = results.len(), score = candidate.as_ref().map_or(0.0, |c| c.score), "local retrieval");
        Ok(candidate)
    }
}

/// Score the first result and join every result's text.
///
/// Texts are trimmed with line breaks turned into spaces and joined with
/// single spaces. Output longer than `max_chars` characters is cut so that,
/// marker included, it is exactly `max_chars` long.
pub fn assemble_candidate(results: &[SearchResult], max_chars: usize) -> Option<AnswerCandidate> {
    let first = results.first()?;
    let score = normalize_distance(first.distance);
    let text = results.iter().map(|r| flatten_text(&r.chunk.text)).collect::<Vec<_>>().join(" ");
    Some(AnswerCandidate { text: truncate_chars(text, max_chars), score })
}

pub fn flatten_text(text: &str) -> String {
    text.trim().replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars { return text; }
    let keep = max_chars.saturating_sub(TRUNCATION_MARKER.len());
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}
