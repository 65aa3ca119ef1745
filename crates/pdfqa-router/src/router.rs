use tracing::{debug, warn};

use pdfqa_core::config::RetrievalSettings;
use pdfqa_core::traits::{KnowledgeSource, VectorIndex};
use pdfqa_core::types::{Answer, FallbackReason};

use crate::fallback::ExternalFallback;
use crate::retriever::LocalRetriever;

/// Chooses between the local candidate and the external fallback.
pub struct AnswerRouter<I, K> {
    retriever: LocalRetriever<I>,
    fallback: ExternalFallback<K>,
    threshold: f32,
}

impl<I: VectorIndex, K: KnowledgeSource> AnswerRouter<I, K> {
    pub fn new(retriever: LocalRetriever<I>, fallback: ExternalFallback<K>, settings: &RetrievalSettings) -> Self {
        Self { retriever, fallback, threshold: settings.threshold }
    }

    pub fn threshold(&self) -> f32 { self.threshold }

    pub fn retriever(&self) -> &LocalRetriever<I> { &self.retriever }

    /// Answer a question. Per-query failures end up in the answer text, never as errors.
    pub fn answer(&self, question: &str) -> Answer {
        let (reason, local_score) = match self.retriever.retrieve(question) {
            Ok(Some(candidate)) if !candidate.is_blank() && candidate.score >= self.threshold => {
                debug!(score = candidate.score, threshold = self.threshold, "answering from local index");
                return Answer::local(candidate);
            }
            Ok(Some(candidate)) if !candidate.is_blank() => (FallbackReason::LowScore { score: candidate.score }, Some(candidate.score)),
            Ok(_) => (FallbackReason::NoLocalCandidate, None),
            Err(e) => {
                warn!(error = %e, "local search failed");
                (FallbackReason::LocalSearchFailed, None)
            }
        };
        debug!(%reason, "answering from external fallback");
        Answer::external(self.fallback.answer_text(question), reason, local_score)
    }
}
