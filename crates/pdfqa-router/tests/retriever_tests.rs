use pdfqa_core::config::RetrievalSettings;
use pdfqa_core::score::normalize_distance;
use pdfqa_core::traits::VectorIndex;
use pdfqa_core::types::{Chunk, SearchResult};
use pdfqa_router::retriever::{assemble_candidate, flatten_text, TRUNCATION_MARKER};
use pdfqa_router::LocalRetriever;

fn hit(text: &str, distance: Option<f32>) -> SearchResult {
    SearchResult { chunk: Chunk { id: "d:1:0".into(), source: "d.pdf".into(), page: None, text: text.into() }, distance }
}

struct Fixed(Vec<SearchResult>);

impl VectorIndex for Fixed {
    fn search(&self, _query: &str, k: usize) -> anyhow::Result<Vec<SearchResult>> { Ok(self.0.iter().take(k).cloned().collect()) }
}

#[test]
fn empty_results_yield_no_candidate() {
    let retriever = LocalRetriever::new(Fixed(vec![]), &RetrievalSettings::default());
    assert_eq!(retriever.retrieve("anything").unwrap(), None);
}

#[test]
fn score_comes_from_first_result_only() {
    let a = assemble_candidate(&[hit("first", Some(0.25)), hit("second", Some(9.0))], 1000).unwrap();
    let b = assemble_candidate(&[hit("first", Some(0.25)), hit("second", Some(0.01))], 1000).unwrap();
    assert_eq!(a.score, normalize_distance(Some(0.25)));
    assert_eq!(a.score, b.score);
    assert_eq!(a.text, "first second");
}

#[test]
fn malformed_first_distance_scores_zero() {
    let c = assemble_candidate(&[hit("text", None)], 1000).unwrap();
    assert_eq!(c.score, 0.0);
}

#[test]
fn only_top_k_results_are_joined() {
    let index = Fixed(vec![hit("one", Some(0.1)), hit("two", Some(0.2)), hit("three", Some(0.3))]);
    let retriever = LocalRetriever::new(index, &RetrievalSettings::default());
    assert_eq!(retriever.top_k(), 2);
    assert_eq!(retriever.retrieve("q").unwrap().unwrap().text, "one two");
}

#[test]
fn line_breaks_become_spaces() {
    assert_eq!(flatten_text("  line one\nline two\r\nline three \n"), "line one line two line three");
    let c = assemble_candidate(&[hit("a\nb", Some(0.0)), hit("\nc\n", Some(0.1))], 1000).unwrap();
    assert_eq!(c.text, "a b c");
}

#[test]
fn long_text_is_capped_with_marker() {
    let long = "x".repeat(800);
    let c = assemble_candidate(&[hit(&long, Some(0.1)), hit(&long, Some(0.2))], 1000).unwrap();
    assert_eq!(c.text.chars().count(), 1000);
    assert!(c.text.ends_with(TRUNCATION_MARKER));
    assert!(c.text.starts_with(&"x".repeat(996)));
}

#[test]
fn text_at_the_limit_is_untouched() {
    let exact = "y".repeat(1000);
    let c = assemble_candidate(&[hit(&exact, Some(0.1))], 1000).unwrap();
    assert_eq!(c.text, exact);
}

#[test]
fn truncation_counts_characters_not_bytes() {
    let text = "é".repeat(1200);
    let c = assemble_candidate(&[hit(&text, Some(0.1))], 1000).unwrap();
    assert_eq!(c.text.chars().count(), 1000);
    assert!(c.text.ends_with("...."));
}
