//! Setup and console formatting shared by the `pdfqa-*` binaries.

use anyhow::{bail, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use pdfqa_core::config::{Config, Settings};
use pdfqa_core::error::Error;
use pdfqa_core::score::normalize_distance;
use pdfqa_core::traits::{KnowledgeSource, VectorIndex};
use pdfqa_core::types::{Answer, AnswerSource, SearchResult};
use pdfqa_embed::get_default_embedder;
use pdfqa_router::AnswerRouter;
use pdfqa_vector::LanceVectorIndex;

pub const RULE_WIDTH: usize = 80;
pub const SNIPPET_CHARS: usize = 800;

/// Diagnostics go to stderr; `RUST_LOG` overrides `default_level`.
pub fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // a second init (tests) is harmless
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(io::stderr).compact().try_init();
}

/// Layered settings, or a single TOML file when `--config` is given.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    let config = match config_path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    Ok(config.settings()?)
}

/// Open the persisted index with the configured embedder.
///
/// A missing or incompatible index ends the process with a hint to rebuild it.
pub fn open_index_or_exit(settings: &Settings) -> Result<LanceVectorIndex> {
    let embedder = get_default_embedder(&settings.embed)?;
    let index_dir = settings.data.index_dir_path();
    match LanceVectorIndex::open(&index_dir, &settings.data.table, embedder) {
        Ok(index) => Ok(index),
        Err(e @ Error::IndexLoad { .. }) => {
            eprintln!("❌ {e}");
            eprintln!("   Build the index first: pdfqa-index <PDF_DIR> --index-dir {}", index_dir.display());
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// What the question loop should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
pub enum Prompted {
    Question(String),
    Quit,
}

/// Empty input, `exit` and `quit` (any case) end the session.
pub fn classify_input(line: &str) -> Prompted {
    let q = line.trim();
    if q.is_empty() || q.eq_ignore_ascii_case("exit") || q.eq_ignore_ascii_case("quit") {
        Prompted::Quit
    } else {
        Prompted::Question(q.to_string())
    }
}

/// Write `prompt` to `out` and read one line. End of input counts as quitting.
pub fn prompt_line(prompt: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<Prompted> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(Prompted::Quit);
    }
    Ok(classify_input(&line))
}

/// Route `question` and write the answer, as one JSON line when `json` is set.
pub fn write_answer<I: VectorIndex, K: KnowledgeSource>(
    router: &AnswerRouter<I, K>,
    question: &str,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let answer = router.answer(question);
    if json {
        writeln!(out, "{}", serde_json::to_string(&answer)?)?;
    } else {
        writeln!(out, "\n{}", format_answer(&answer))?;
        writeln!(out, "\n{}\n", rule())?;
    }
    Ok(())
}

/// Answer a question given on the command line.
///
/// Input the loop would treat as quitting (blank, `exit`, `quit`) is rejected
/// before anything is searched.
pub fn answer_one_shot<I: VectorIndex, K: KnowledgeSource>(
    router: &AnswerRouter<I, K>,
    raw: &str,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    match classify_input(raw) {
        Prompted::Question(q) => write_answer(router, &q, json, out),
        Prompted::Quit => bail!("--question needs a question, got {raw:?}"),
    }
}

pub fn rule() -> String { "=".repeat(RULE_WIDTH) }

pub fn format_answer(answer: &Answer) -> String {
    match answer.source {
        AnswerSource::Local => {
            format!("Answer from PDFs (score ~ {:.3}):\n\n{}", answer.score.unwrap_or(0.0), answer.text)
        }
        AnswerSource::External => {
            let note = answer.note.as_deref().unwrap_or("no relevant local match.");
            format!("{note}\nAnswer from Wikipedia\n\n{}", answer.text)
        }
    }
}

/// Trimmed, single-line, at most [`SNIPPET_CHARS`] characters plus `...`.
pub fn snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(SNIPPET_CHARS).collect();
    cut.push_str("...");
    cut
}

pub fn format_result(rank: usize, result: &SearchResult) -> String {
    let score = normalize_distance(result.distance);
    let dist = result.distance.map_or_else(|| "n/a".to_string(), |d| format!("{d:.4}"));
    let page = result.chunk.page.map(|p| format!(" | Page: {p}")).unwrap_or_default();
    format!(
        "--- Result #{rank} (score ~ {score:.3}, dist={dist}) ---\nSource: {}{page}\nSnippet:\n{}\n{}",
        result.chunk.source,
        snippet(&result.chunk.text),
        "-".repeat(RULE_WIDTH)
    )
}
