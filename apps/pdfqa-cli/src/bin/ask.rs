use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

use pdfqa_cli::{answer_one_shot, prompt_line, write_answer, Prompted};
use pdfqa_router::{AnswerRouter, ExternalFallback, LocalRetriever};
use pdfqa_wiki::WikipediaClient;

/// Answer questions from the local PDFs, falling back to Wikipedia.
#[derive(Parser, Debug)]
#[command(name = "pdfqa-ask", version)]
struct Args {
    /// Answer a single question and exit.
    #[arg(short, long)]
    question: Option<String>,

    /// Print answers as JSON lines on stdout; prompts and banners go to stderr.
    #[arg(long)]
    json: bool,

    #[arg(short, long, value_name = "CONFIG_PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    pdfqa_cli::init_tracing("warn");
    let args = Args::parse();
    let settings = pdfqa_cli::load_settings(args.config.as_deref())?;
    let mut chatter: Box<dyn Write> = if args.json { Box::new(io::stderr()) } else { Box::new(io::stdout()) };
    let mut stdout = io::stdout();

    writeln!(chatter, "Loading vector index...")?;
    let index = pdfqa_cli::open_index_or_exit(&settings)?;
    let embedder_id = index.embedder().model_id().to_string();
    let router = AnswerRouter::new(
        LocalRetriever::new(index, &settings.retrieval),
        ExternalFallback::new(WikipediaClient::new(&settings.wiki)?, &settings.wiki),
        &settings.retrieval,
    );

    if let Some(question) = args.question {
        return answer_one_shot(&router, &question, args.json, &mut stdout);
    }

    writeln!(chatter, "Embedding model: {embedder_id}")?;
    writeln!(chatter, "You can ask questions. Type 'exit' to quit.\n")?;
    let mut stdin = io::stdin().lock();
    while let Prompted::Question(q) = prompt_line("Your question: ", &mut stdin, &mut chatter)? {
        write_answer(&router, &q, args.json, &mut stdout)?;
    }
    writeln!(chatter, "Bye!")?;
    Ok(())
}
