use anyhow::{anyhow, bail, Context, Result};
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use pdfqa_core::error::Error;
use pdfqa_core::traits::Embedder;
use pdfqa_core::types::Chunk;

use crate::schema::build_chunk_schema;
use crate::table::{open_db, set_meta, META_CHUNK_COUNT, META_DIM, META_EMBEDDER_ID};

const INSERT_BATCH: usize = 1000;

pub struct LanceDbIndexer { pub(crate) db: Connection, pub(crate) table_name: String }

impl LanceDbIndexer {
	pub async fn new(db_path: &Path, table_name: &str) -> Result<Self> {
		let db = open_db(db_path.to_string_lossy().as_ref()).await?;
		Ok(Self { db, table_name: table_name.to_string() })
	}

	/// Wipe `db_path` and open an empty database there.
	///
	/// Refuses to delete a non-empty directory that holds no `.lance` tables.
	pub async fn create_fresh(db_path: &Path, table_name: &str) -> Result<Self> {
		if db_path.exists() {
			let mut entries = fs::read_dir(db_path).with_context(|| format!("reading {}", db_path.display()))?.filter_map(|e| e.ok()).peekable();
			let is_empty = entries.peek().is_none();
			let looks_like_index = entries.any(|e| e.path().extension().is_some_and(|ext| ext == "lance"));
			if !is_empty && !looks_like_index {
				return Err(Error::Operation(format!("refusing to overwrite {}: it is not empty and holds no vector index", db_path.display())).into());
			}
			fs::remove_dir_all(db_path)?;
		}
		fs::create_dir_all(db_path)?;
		Self::new(db_path, table_name).await
	}

	/// Embed `chunks` in batches of `batch_size` and write them with the embedder identity.
	pub async fn index_with(&self, chunks: &[Chunk], embedder: &dyn Embedder, batch_size: usize) -> Result<usize> {
		if chunks.is_empty() { info!("no chunks to index"); return Ok(0); }
		let pb = progress_bar(chunks.len(), "embedding");
		let mut embeddings = Vec::with_capacity(chunks.len());
		for batch in chunks.chunks(batch_size.max(1)) {
			let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
			embeddings.extend(embedder.embed_batch(&texts)?);
			pb.inc(batch.len() as u64);
		}
		pb.finish_with_message("embedded");
		self.index(chunks, &embeddings, embedder).await
	}

	pub async fn index(&self, chunks: &[Chunk], embeddings: &[Vec<f32>], embedder: &dyn Embedder) -> Result<usize> {
		if chunks.len() != embeddings.len() { bail!("chunks ({}) and embeddings ({}) length must match", chunks.len(), embeddings.len()); }
		let dim = embedder.dim();
		if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) { bail!("embedding has {} dims, embedder reports {}", bad.len(), dim); }
		info!(chunks = chunks.len(), table = %self.table_name, "writing chunks to LanceDB");
		let pb = progress_bar(chunks.len(), "writing");
		let mut written = 0usize;
		for (chunk_batch, emb_batch) in chunks.chunks(INSERT_BATCH).zip(embeddings.chunks(INSERT_BATCH)) {
			self.insert_batch(chunk_batch, emb_batch, dim).await?;
			written += chunk_batch.len();
			pb.set_position(written as u64);
		}
		pb.finish_with_message("indexed");
		set_meta(&self.db, META_EMBEDDER_ID, embedder.model_id()).await?;
		set_meta(&self.db, META_DIM, &dim.to_string()).await?;
		set_meta(&self.db, META_CHUNK_COUNT, &written.to_string()).await?;
		info!(written, embedder = embedder.model_id(), "index written");
		Ok(written)
	}

	async fn insert_batch(&self, chunks: &[Chunk], embeddings: &[Vec<f32>], dim: usize) -> Result<()> {
		if chunks.is_empty() { return Ok(()); }
		let record_batch = to_record_batch(chunks, embeddings, dim)?; let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		if self.db.table_names().execute().await?.contains(&self.table_name) {
			self.db.open_table(&self.table_name).execute().await?.add(reader).execute().await?;
		} else {
			self.db.create_table(&self.table_name, reader).execute().await?;
		}
		Ok(())
	}
}

fn to_record_batch(chunks: &[Chunk], embeddings: &[Vec<f32>], dim: usize) -> Result<RecordBatch> {
	let dim = i32::try_from(dim).map_err(|_| anyhow!("embedding dimension {} too large", dim))?;
	let mut ids = Vec::new(); let mut sources = Vec::new(); let mut pages = Vec::new(); let mut texts = Vec::new();
	let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
	for (chunk, embedding) in chunks.iter().zip(embeddings) {
		ids.push(chunk.id.clone()); sources.push(chunk.source.clone()); texts.push(chunk.text.clone());
		pages.push(chunk.page.and_then(|p| i32::try_from(p).ok()));
		vectors.push(Some(embedding.iter().map(|&x| Some(x)).collect()));
	}
	let record_batch = RecordBatch::try_new(build_chunk_schema(dim), vec![
		Arc::new(StringArray::from(ids)),
		Arc::new(StringArray::from(sources)),
		Arc::new(Int32Array::from(pages)),
		Arc::new(StringArray::from(texts)),
		Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim)),
	])?;
	Ok(record_batch)
}

fn progress_bar(len: usize, msg: &'static str) -> ProgressBar {
	let pb = ProgressBar::new(len as u64);
	if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}") {
		pb.set_style(style.progress_chars("#>-"));
	}
	pb.set_message(msg);
	pb
}
