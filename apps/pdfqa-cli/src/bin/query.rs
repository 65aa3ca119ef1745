use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;

use pdfqa_cli::{format_result, prompt_line, rule, Prompted};
use pdfqa_core::score::normalize_distance;
use pdfqa_core::traits::VectorIndex;

/// Inspect the raw nearest chunks for a question.
#[derive(Parser, Debug)]
#[command(name = "pdfqa-query", version)]
struct Args {
    /// Results per question (default: `retrieval.top_k`).
    #[arg(short, long)]
    k: Option<usize>,

    #[arg(short, long, value_name = "CONFIG_PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    pdfqa_cli::init_tracing("warn");
    let args = Args::parse();
    let settings = pdfqa_cli::load_settings(args.config.as_deref())?;
    let k = args.k.unwrap_or(settings.retrieval.top_k);

    let index = pdfqa_cli::open_index_or_exit(&settings)?;
    println!("Index loaded from: {}", index.path().display());
    println!("Embedding model: {}", index.embedder().model_id());
    println!("Type 'exit' or an empty line to quit.\n");

    let mut stdin = io::stdin().lock();
    while let Prompted::Question(q) = prompt_line("Your question: ", &mut stdin, &mut io::stdout())? {
        let results = match index.search(&q, k) {
            Ok(results) => results,
            Err(e) => {
                eprintln!("Search failed: {e:#}");
                continue;
            }
        };
        if results.is_empty() {
            println!("No results returned.");
            continue;
        }
        println!("\nTop {} results for query: {q:?}", results.len());
        for (rank, result) in results.iter().enumerate() {
            println!("\n{}", format_result(rank + 1, result));
        }
        let best = normalize_distance(results[0].distance);
        println!("\nBest approx. score: {best:.3}");
        if best < settings.retrieval.low_similarity_hint {
            println!("Note: similarity is low, the answer might not be in your PDFs (consider the Wikipedia fallback).");
        }
        println!("\n{}\n", rule());
    }
    println!("Bye!");
    Ok(())
}
