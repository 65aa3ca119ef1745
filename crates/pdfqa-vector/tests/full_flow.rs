use std::path::Path;

use pdfqa_core::error::Error;
use pdfqa_core::traits::{Embedder, VectorIndex};
use pdfqa_core::types::Chunk;
use pdfqa_embed::FakeEmbedder;
use pdfqa_vector::{LanceDbIndexer, LanceVectorIndex};
use tempfile::TempDir;

const TABLE: &str = "chunks_test";

fn chunk(i: usize, text: &str) -> Chunk {
    Chunk { id: format!("paper:{}:0", i + 1), source: "papers/paper.pdf".to_string(), page: Some(i as u32 + 1), text: text.to_string() }
}

fn corpus() -> Vec<Chunk> {
    [
        "Paris is the capital of France.",
        "The mitochondria is the powerhouse of the cell.",
        "Transformers rely on self attention over token sequences.",
        "Rust guarantees memory safety without garbage collection.",
    ]
    .iter()
    .enumerate()
    .map(|(i, t)| chunk(i, t))
    .collect()
}

fn build(dir: &Path, embedder: &dyn Embedder) -> usize {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let indexer = LanceDbIndexer::create_fresh(dir, TABLE).await.expect("indexer");
        indexer.index_with(&corpus(), embedder, 2).await.expect("index")
    })
}

#[test]
fn build_then_search_returns_closest_first() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("index");
    let written = build(&dir, &FakeEmbedder::new(64));
    assert_eq!(written, 4);

    let index = LanceVectorIndex::open(&dir, TABLE, Box::new(FakeEmbedder::new(64))).expect("open");
    let results = index.search("Paris is the capital of France.", 2).expect("search");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.text, "Paris is the capital of France.");
    assert_eq!(results[0].chunk.page, Some(1));
    assert_eq!(results[0].chunk.source, "papers/paper.pdf");
    let d0 = results[0].distance.expect("distance");
    let d1 = results[1].distance.expect("distance");
    assert!(d0 < 1e-4, "identical text should be at distance ~0, got {d0}");
    assert!(d0 <= d1, "results ordered by increasing distance");
}

#[test]
fn zero_k_returns_nothing() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("index");
    build(&dir, &FakeEmbedder::new(64));
    let index = LanceVectorIndex::open(&dir, TABLE, Box::new(FakeEmbedder::new(64))).expect("open");
    assert!(index.search("anything", 0).unwrap().is_empty());
}

#[test]
fn missing_index_is_a_load_failure() {
    let tmp = TempDir::new().unwrap();
    let err = LanceVectorIndex::open(&tmp.path().join("absent"), TABLE, Box::new(FakeEmbedder::new(64))).err().expect("must fail");
    assert!(matches!(err, Error::IndexLoad { .. }));
}

#[test]
fn missing_table_is_a_load_failure() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("index");
    build(&dir, &FakeEmbedder::new(64));
    let err = LanceVectorIndex::open(&dir, "other_table", Box::new(FakeEmbedder::new(64))).err().expect("must fail");
    assert!(err.to_string().contains("other_table"));
}

#[test]
fn embedder_mismatch_is_a_load_failure() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("index");
    build(&dir, &FakeEmbedder::new(64));
    let err = LanceVectorIndex::open(&dir, TABLE, Box::new(FakeEmbedder::new(32))).err().expect("must fail");
    match err {
        Error::IndexLoad { reason, .. } => assert!(reason.contains("fake:xxhash:d64"), "{reason}"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn create_fresh_refuses_foreign_directories() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("thesis.docx"), b"precious").unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let err = rt.block_on(LanceDbIndexer::create_fresh(tmp.path(), TABLE)).err().expect("must refuse");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Operation(_))), "{err}");
    assert!(tmp.path().join("thesis.docx").exists());
}

#[test]
fn rebuild_replaces_previous_contents() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("index");
    build(&dir, &FakeEmbedder::new(64));
    build(&dir, &FakeEmbedder::new(64));
    let index = LanceVectorIndex::open(&dir, TABLE, Box::new(FakeEmbedder::new(64))).expect("open");
    let results = index.search("Paris is the capital of France.", 10).unwrap();
    assert_eq!(results.len(), 4, "second build must not append duplicates");
}
