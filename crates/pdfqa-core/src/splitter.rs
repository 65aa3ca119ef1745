//! Recursive character splitter.
//!
//! Text is split on the first separator (in priority order) that occurs in it.
//! Each separator stays attached to the start of the piece that follows it, so
//! merging pieces back together restores the original text. Pieces still
//! longer than `chunk_size` are split again with the remaining separators.
//! Small neighbouring pieces are then merged back up to `chunk_size`, carrying
//! up to `chunk_overlap` characters of trailing context into the next chunk.
//! Chunks are trimmed; lengths are measured in characters.

use std::collections::VecDeque;

use crate::config::SplitterSettings;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for RecursiveSplitter {
    fn default() -> Self { Self::from_settings(&SplitterSettings::default()) }
}

impl RecursiveSplitter {
    /// `chunk_overlap` is capped below `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self { chunk_size, chunk_overlap: chunk_overlap.min(chunk_size - 1) }
    }

    pub fn from_settings(settings: &SplitterSettings) -> Self { Self::new(settings.chunk_size, settings.chunk_overlap) }

    pub fn split(&self, text: &str) -> Vec<String> { self.split_with(text, &SEPARATORS) }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = "";
        let mut remaining: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() { separator = sep; break; }
            if text.contains(sep) { separator = sep; remaining = &separators[i + 1..]; break; }
        }

        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            split_keeping_separator(text, separator)
        };

        let mut out = Vec::new();
        let mut short = Vec::new();
        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                short.push(piece);
                continue;
            }
            if !short.is_empty() { out.extend(self.merge(&short)); short.clear(); }
            if remaining.is_empty() { out.push(piece); } else { out.extend(self.split_with(&piece, remaining)); }
        }
        if !short.is_empty() { out.extend(self.merge(&short)); }
        out
    }

    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&mut docs, &window);
                // drop from the front until only the overlap remains and the new piece fits
                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    let Some(front) = window.pop_front() else { break };
                    total -= char_len(front);
                }
            }
            total += len;
            window.push_back(piece);
        }
        push_joined(&mut docs, &window);
        docs
    }
}

/// `"a\n\nb\n\nc"` on `"\n\n"` gives `["a", "\n\nb", "\n\nc"]`; empty pieces are dropped.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        pieces.push(&text[start..idx]);
        start = idx;
    }
    pieces.push(&text[start..]);
    pieces.into_iter().filter(|p| !p.is_empty()).map(str::to_string).collect()
}

fn push_joined(docs: &mut Vec<String>, window: &VecDeque<&str>) {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() { docs.push(trimmed.to_string()); }
}

fn char_len(s: &str) -> usize { s.chars().count() }
