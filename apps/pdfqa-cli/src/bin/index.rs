use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use pdfqa_core::data_processor::DataProcessor;
use pdfqa_embed::get_default_embedder;
use pdfqa_vector::LanceDbIndexer;

/// Build the local PDF vector index.
#[derive(Parser, Debug)]
#[command(name = "pdfqa-index", version)]
struct Args {
    /// Folder searched recursively for `*.pdf` (default: `data.pdf_dir`).
    pdf_dir: Option<PathBuf>,

    /// Where to write the index (default: `data.index_dir`). Recreated on every run.
    #[arg(long, value_name = "DIR")]
    index_dir: Option<PathBuf>,

    /// Only index the first N PDFs in path order.
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    #[arg(short, long, value_name = "CONFIG_PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    pdfqa_cli::init_tracing("info");
    let args = Args::parse();
    let settings = pdfqa_cli::load_settings(args.config.as_deref())?;
    let pdf_dir = args.pdf_dir.unwrap_or_else(|| settings.data.pdf_dir_path());
    let index_dir = args.index_dir.unwrap_or_else(|| settings.data.index_dir_path());

    println!("PDF Index Builder\n=================");
    println!("PDF folder: {}", pdf_dir.display());
    println!("Index directory: {}", index_dir.display());

    let processor = DataProcessor::with_splitter(&settings.splitter);
    let pages = processor.load_pages(&pdf_dir, args.limit.unwrap_or(usize::MAX))?;
    println!("Loaded {} page documents", pages.len());
    let chunks = processor.split_pages(&pages);
    println!("Split into {} chunks", chunks.len());
    if chunks.is_empty() {
        bail!("no extractable text found under {}", pdf_dir.display());
    }

    info!("loading embedding model");
    let embedder = get_default_embedder(&settings.embed)?;
    let rt = tokio::runtime::Runtime::new()?;
    let written = rt.block_on(async {
        let indexer = LanceDbIndexer::create_fresh(&index_dir, &settings.data.table).await?;
        indexer.index_with(&chunks, embedder.as_ref(), settings.embed.batch_size).await
    })?;

    println!("\n✅ Index saved: {written} chunks embedded with {}", embedder.model_id());
    println!("💡 Ask questions with: pdfqa-ask");
    Ok(())
}
