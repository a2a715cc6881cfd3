use fxqa_domain::chunk::{ChunkMetadata, DocumentChunk};
use fxqa_storage::{
	db::Db,
	models::{DocumentRow, NewDocument},
	queries,
};

use crate::{BoxFuture, DocumentStore, Result};

/// [`DocumentStore`] backed by the Postgres `documents` table.
pub struct PgDocumentStore {
	db: Db,
}
impl PgDocumentStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	async fn dense(&self, query_embedding: &[f32], match_count: u32) -> Result<Vec<DocumentChunk>> {
		let rows = queries::match_documents(&self.db.pool, query_embedding, match_count).await?;

		Ok(chunks_from_rows(rows))
	}

	async fn hybrid(
		&self,
		query_embedding: &[f32],
		query_text: &str,
		match_count: u32,
	) -> Result<Vec<DocumentChunk>> {
		let rows =
			queries::hybrid_match_documents(&self.db.pool, query_embedding, query_text, match_count)
				.await?;

		Ok(chunks_from_rows(rows))
	}

	async fn full_text(&self, query_text: &str, limit: u32) -> Result<Vec<DocumentChunk>> {
		let rows = queries::text_search_documents(&self.db.pool, query_text, limit).await?;

		Ok(chunks_from_rows(rows))
	}

	async fn insert(&self, chunk: &DocumentChunk, embedding: &[f32]) -> Result<()> {
		let metadata = serde_json::json!({
			"source": chunk.metadata.source,
			"chunk_id": chunk.metadata.chunk_id,
		});

		queries::insert_document(
			&self.db.pool,
			&NewDocument { content: &chunk.content, metadata: &metadata, embedding },
		)
		.await?;

		Ok(())
	}

	async fn delete(&self, source: &str) -> Result<u64> {
		Ok(queries::delete_documents_by_source(&self.db.pool, source).await?)
	}
}

impl DocumentStore for PgDocumentStore {
	fn match_documents<'a>(
		&'a self,
		query_embedding: &'a [f32],
		match_count: u32,
	) -> BoxFuture<'a, Result<Vec<DocumentChunk>>> {
		Box::pin(self.dense(query_embedding, match_count))
	}

	fn hybrid_match_documents<'a>(
		&'a self,
		query_embedding: &'a [f32],
		query_text: &'a str,
		match_count: u32,
	) -> BoxFuture<'a, Result<Vec<DocumentChunk>>> {
		Box::pin(self.hybrid(query_embedding, query_text, match_count))
	}

	fn text_search<'a>(
		&'a self,
		query_text: &'a str,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<DocumentChunk>>> {
		Box::pin(self.full_text(query_text, limit))
	}

	fn insert_document<'a>(
		&'a self,
		chunk: &'a DocumentChunk,
		embedding: &'a [f32],
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.insert(chunk, embedding))
	}

	fn delete_source<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<u64>> {
		Box::pin(self.delete(source))
	}
}

fn chunks_from_rows(rows: Vec<DocumentRow>) -> Vec<DocumentChunk> {
	rows.into_iter().map(chunk_from_row).collect()
}

/// Rows written by other tools may carry partial metadata. Missing fields fall back to defaults.
fn chunk_from_row(row: DocumentRow) -> DocumentChunk {
	let metadata = match serde_json::from_value::<ChunkMetadata>(row.metadata) {
		Ok(metadata) => metadata,
		Err(err) => {
			tracing::warn!(error = %err, "Stored chunk metadata is malformed. Using defaults.");

			ChunkMetadata::default()
		},
	};

	DocumentChunk { content: row.content, metadata }
}
