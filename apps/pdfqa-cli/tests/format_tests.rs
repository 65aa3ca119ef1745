use std::io::Cursor;

use pdfqa_cli::{classify_input, format_answer, format_result, prompt_line, rule, snippet, Prompted, SNIPPET_CHARS};
use pdfqa_core::types::{Answer, AnswerCandidate, Chunk, FallbackReason, SearchResult};

#[test]
fn quit_words_and_blank_lines_end_the_session() {
    for line in ["", "   \n", "exit", "EXIT\n", " Quit "] {
        assert_eq!(classify_input(line), Prompted::Quit, "{line:?}");
    }
    assert_eq!(classify_input("  what is rust?\n"), Prompted::Question("what is rust?".into()));
}

#[test]
fn end_of_input_quits() {
    let mut prompts = Vec::new();
    let mut input = Cursor::new(Vec::new());
    assert_eq!(prompt_line("Your question: ", &mut input, &mut prompts).unwrap(), Prompted::Quit);
    assert_eq!(prompts, b"Your question: ");
    let mut input = Cursor::new(b"capital of France?\nexit\n".to_vec());
    assert_eq!(prompt_line("", &mut input, &mut prompts).unwrap(), Prompted::Question("capital of France?".into()));
    assert_eq!(prompt_line("", &mut input, &mut prompts).unwrap(), Prompted::Quit);
}

#[test]
fn local_answer_shows_score() {
    let answer = Answer::local(AnswerCandidate { text: "Paris is the capital of France.".into(), score: 0.7 });
    assert_eq!(format_answer(&answer), "Answer from PDFs (score ~ 0.700):\n\nParis is the capital of France.");
}

#[test]
fn external_answer_shows_reason_first() {
    let answer = Answer::external("From Wikipedia (X):\n\nX is.".into(), FallbackReason::LowScore { score: 0.3 }, Some(0.3));
    let out = format_answer(&answer);
    assert!(out.starts_with("local score below threshold (0.300).\nAnswer from Wikipedia"));
    assert!(out.ends_with("X is."));
}

#[test]
fn rule_is_eighty_equals_signs() {
    assert_eq!(rule().len(), 80);
    assert!(rule().chars().all(|c| c == '='));
}

#[test]
fn snippet_collapses_and_caps() {
    assert_eq!(snippet("  a\n b\t c  "), "a b c");
    let long = snippet(&"word ".repeat(400));
    assert_eq!(long.chars().count(), SNIPPET_CHARS + 3);
    assert!(long.ends_with("..."));
}

#[test]
fn result_block_lists_source_page_and_score() {
    let result = SearchResult {
        chunk: Chunk { id: "paper:3:0".into(), source: "papers/paper.pdf".into(), page: Some(3), text: "some text".into() },
        distance: Some(1.0),
    };
    let out = format_result(1, &result);
    assert!(out.starts_with("--- Result #1 (score ~ 0.500, dist=1.0000) ---"));
    assert!(out.contains("Source: papers/paper.pdf | Page: 3"));
    assert!(out.contains("some text"));

    let malformed = SearchResult { distance: None, ..result };
    assert!(format_result(2, &malformed).contains("(score ~ 0.000, dist=n/a)"));
}
