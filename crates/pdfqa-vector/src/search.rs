use anyhow::{anyhow, Result};
use arrow_array::{Array, Float32Array, Float64Array, Int32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use pdfqa_core::error::Error;
use pdfqa_core::traits::{Embedder, VectorIndex};
use pdfqa_core::types::{Chunk, SearchResult};

use crate::table::{get_meta, open_db, table_exists, META_EMBEDDER_ID};

/// A persisted chunk table opened for read-only similarity search.
///
/// Owns a tokio runtime so it can serve the synchronous [`VectorIndex`]
/// contract. Must not be opened or queried from inside another runtime.
pub struct LanceVectorIndex {
	rt: Runtime,
	table: Table,
	embedder: Box<dyn Embedder>,
	path: PathBuf,
}

impl LanceVectorIndex {
	/// Open the index at `db_path`. Every failure here is an [`Error::IndexLoad`].
	///
	/// The index must have been built by an embedder with the same identity as `embedder`.
	pub fn open(db_path: &Path, table_name: &str, embedder: Box<dyn Embedder>) -> pdfqa_core::error::Result<Self> {
		let shown = db_path.display().to_string();
		if !db_path.is_dir() { return Err(Error::index_load(shown, "index directory does not exist")); }
		let rt = Runtime::new().map_err(|e| Error::index_load(&shown, e))?;
		let table = rt.block_on(async {
			let conn = open_db(db_path.to_string_lossy().as_ref()).await.map_err(|e| Error::index_load(&shown, e))?;
			if !table_exists(&conn, table_name).await.map_err(|e| Error::index_load(&shown, e))? {
				return Err(Error::index_load(&shown, format!("table '{table_name}' not found")));
			}
			let built_with = get_meta(&conn, META_EMBEDDER_ID).await.map_err(|e| Error::index_load(&shown, e))?
				.ok_or_else(|| Error::index_load(&shown, "index has no recorded embedder identity"))?;
			if built_with != embedder.model_id() {
				return Err(Error::index_load(&shown, format!("index was built with '{}' but the current embedder is '{}'", built_with, embedder.model_id())));
			}
			conn.open_table(table_name).execute().await.map_err(|e| Error::index_load(&shown, e))
		})?;
		let rows = rt.block_on(table.count_rows(None)).map_err(|e| Error::index_load(&shown, e))?;
		info!(path = %shown, table = table_name, rows, embedder = embedder.model_id(), "vector index loaded");
		Ok(Self { rt, table, embedder, path: db_path.to_path_buf() })
	}

	pub fn path(&self) -> &Path { &self.path }

	pub fn embedder(&self) -> &dyn Embedder { self.embedder.as_ref() }

	async fn nearest(&self, query_vec: Vec<f32>, k: usize) -> Result<Vec<SearchResult>> {
		let mut stream = self.table.vector_search(query_vec)?.distance_type(DistanceType::L2).limit(k).execute().await?;
		let mut results = Vec::new();
		while let Some(batch) = stream.try_next().await? {
			results.extend(rows_to_results(&batch)?);
		}
		Ok(results)
	}
}

impl VectorIndex for LanceVectorIndex {
	fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
		if k == 0 { return Ok(vec![]); }
		let query_vec = self.embedder.embed_batch(&[query.to_string()])?.pop().ok_or_else(|| anyhow!("embedder returned no vector"))?;
		let mut results = self.rt.block_on(self.nearest(query_vec, k))?;
		sort_by_distance(&mut results);
		results.truncate(k);
		debug!(k, hits = results.len(), best = ?results.first().and_then(|r| r.distance), "vector search");
		Ok(results)
	}
}

/// Ascending distance; rows without a usable distance go last.
pub fn sort_by_distance(results: &mut [SearchResult]) {
	results.sort_by(|a, b| match (a.distance, b.distance) {
		(Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	});
}

fn rows_to_results(batch: &RecordBatch) -> Result<Vec<SearchResult>> {
	let string_col = |name: &str| batch.column_by_name(name).and_then(|c| c.as_any().downcast_ref::<StringArray>()).ok_or_else(|| anyhow!("missing {} column", name));
	let ids = string_col("id")?;
	let sources = string_col("source")?;
	let texts = string_col("text")?;
	let pages = batch.column_by_name("page").and_then(|c| c.as_any().downcast_ref::<Int32Array>());
	let distance_col = batch.column_by_name("_distance");
	let mut out = Vec::with_capacity(batch.num_rows());
	for i in 0..batch.num_rows() {
		let page = pages.filter(|p| p.is_valid(i)).and_then(|p| u32::try_from(p.value(i)).ok());
		let chunk = Chunk { id: ids.value(i).to_string(), source: sources.value(i).to_string(), page, text: texts.value(i).to_string() };
		out.push(SearchResult { chunk, distance: distance_col.and_then(|c| read_distance(c.as_ref(), i)) });
	}
	Ok(out)
}

/// `_distance` is normally Float32; anything unreadable is left as `None`.
#[allow(clippy::cast_possible_truncation)]
fn read_distance(col: &dyn Array, i: usize) -> Option<f32> {
	if !col.is_valid(i) { return None; }
	if let Some(a) = col.as_any().downcast_ref::<Float32Array>() { return Some(a.value(i)); }
	col.as_any().downcast_ref::<Float64Array>().map(|a| a.value(i) as f32)
}
