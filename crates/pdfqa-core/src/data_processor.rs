//! PDF discovery, page extraction and chunking for index builds.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::SplitterSettings;
use crate::splitter::RecursiveSplitter;
use crate::types::Chunk;

/// The text of one PDF page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDocument {
    pub source: String,
    /// 1-based page number.
    pub page: u32,
    pub text: String,
}

#[derive(Default)]
pub struct DataProcessor {
    splitter: RecursiveSplitter,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    pub fn with_splitter(settings: &SplitterSettings) -> Self { Self { splitter: RecursiveSplitter::from_settings(settings) } }

    pub fn process_directory(&self, pdf_dir: &Path) -> Result<Vec<Chunk>> { self.process_directory_limited(pdf_dir, usize::MAX) }

    /// Load at most `limit` PDFs (in path order) and split them into chunks.
    pub fn process_directory_limited(&self, pdf_dir: &Path, limit: usize) -> Result<Vec<Chunk>> {
        let pages = self.load_pages(pdf_dir, limit)?;
        info!(pages = pages.len(), "loaded page documents");
        let chunks = self.split_pages(&pages);
        info!(chunks = chunks.len(), "split into chunks");
        Ok(chunks)
    }

    /// Extract every readable page of every PDF under `pdf_dir`.
    ///
    /// Files that cannot be parsed and pages without text are skipped.
    pub fn load_pages(&self, pdf_dir: &Path, limit: usize) -> Result<Vec<PageDocument>> {
        if !pdf_dir.is_dir() {
            return Err(crate::error::Error::NotFound(format!("PDF folder {}", pdf_dir.display())).into());
        }
        let mut files = list_pdf_files(pdf_dir);
        if files.is_empty() { warn!(dir = %pdf_dir.display(), "no .pdf files found"); return Ok(vec![]); }
        if files.len() > limit { files.truncate(limit); info!(limit, "limited to first PDFs"); }
        let mut pages = Vec::new();
        for (file_index, path) in files.iter().enumerate() {
            info!("Processing file {}/{}: {}", file_index + 1, files.len(), path.display());
            match extract_pdf_pages(path) {
                Ok(found) => pages.extend(found),
                Err(e) => warn!(file = %path.display(), error = %e, "skipping unreadable PDF"),
            }
        }
        Ok(pages)
    }

    pub fn split_pages(&self, pages: &[PageDocument]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in pages {
            let stem = Path::new(&page.source).file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_else(|| page.source.clone());
            for (i, text) in self.splitter.split(&page.text).into_iter().enumerate() {
                chunks.push(Chunk { id: format!("{}:{}:{}", stem, page.page, i), source: page.source.clone(), page: Some(page.page), text });
            }
        }
        chunks
    }
}

pub fn extract_pdf_pages(path: &Path) -> Result<Vec<PageDocument>> {
    let doc = lopdf::Document::load(path).with_context(|| format!("failed to parse PDF {}", path.display()))?;
    let source = path.to_string_lossy().to_string();
    let mut pages = Vec::new();
    for (page_num, _object_id) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(text) if !text.trim().is_empty() => pages.push(PageDocument { source: source.clone(), page: page_num, text }),
            Ok(_) => {}
            Err(e) => warn!(file = %source, page = page_num, error = %e, "failed to extract page text"),
        }
    }
    Ok(pages)
}

fn list_pdf_files(root: &Path) -> Vec<PathBuf> {
    let mut pdf_files = Vec::new();
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
        let path = entry.path();
        let is_pdf = path.extension().and_then(|s| s.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf { pdf_files.push(path.to_path_buf()); }
    }
    pdf_files.sort();
    pdf_files
}
