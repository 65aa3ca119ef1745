//! Domain types shared by the index, the retriever and the router.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type ChunkId = String;

/// A chunk of a source PDF that is independently embedded and indexed.
///
/// - `id`: `<doc stem>:<page>:<index>`, unique within one index build
/// - `source`: path of the originating PDF
/// - `page`: 1-based page number, when the loader knows it
/// - `text`: the text payload of the chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub source: String,
    pub page: Option<u32>,
    pub text: String,
}

/// One nearest-neighbour hit as reported by a vector index.
///
/// `distance` is the raw value from the index (smaller is closer). It is
/// `None` when the provider returned nothing usable for this row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub distance: Option<f32>,
}

/// Concatenated local text together with the score of its closest chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerCandidate {
    pub text: String,
    pub score: f32,
}

impl AnswerCandidate {
    /// Whitespace-only text carries no answer.
    pub fn is_blank(&self) -> bool { self.text.trim().is_empty() }
}

/// Which side of the router produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    Local,
    External,
}

/// Why the router skipped the local candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    NoLocalCandidate,
    LowScore { score: f32 },
    LocalSearchFailed,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoLocalCandidate => write!(f, "no relevant local match."),
            FallbackReason::LowScore { score } => write!(f, "local score below threshold ({score:.3})."),
            FallbackReason::LocalSearchFailed => write!(f, "local search failed."),
        }
    }
}

/// The final answer handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub source: AnswerSource,
    pub text: String,
    pub score: Option<f32>,
    pub note: Option<String>,
}

impl Answer {
    pub fn local(candidate: AnswerCandidate) -> Self {
        Self { source: AnswerSource::Local, text: candidate.text, score: Some(candidate.score), note: None }
    }

    /// `score` is the local score that lost, if there was a candidate at all.
    pub fn external(text: String, reason: FallbackReason, score: Option<f32>) -> Self {
        Self { source: AnswerSource::External, text, score, note: Some(reason.to_string()) }
    }

    pub fn is_local(&self) -> bool { self.source == AnswerSource::Local }
}
