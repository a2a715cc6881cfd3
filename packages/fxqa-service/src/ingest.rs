use serde::Serialize;

use fxqa_chunking::ChunkingConfig;
use fxqa_domain::chunk::DocumentChunk;

use crate::{Error, FxService, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IngestReport {
	pub source: String,
	pub chunks: usize,
	/// Rows removed before insertion. Always 0 unless `replace` was requested.
	pub replaced: u64,
}

impl FxService {
	/// Chunks, embeds, and stores one document under `source`.
	pub async fn ingest_text(
		&self,
		text: &str,
		source: &str,
		replace: bool,
	) -> Result<IngestReport> {
		if text.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "Document text must be non-empty.".to_string(),
			});
		}
		if source.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "Document source must be non-empty.".to_string(),
			});
		}

		let chunking = ChunkingConfig {
			max_chars: self.cfg.chunking.max_chars,
			overlap_chars: self.cfg.chunking.overlap_chars,
		};
		let chunks = fxqa_chunking::split_text(text, &chunking);
		let batch_size = self.cfg.providers.embedding.batch_size.max(1) as usize;
		let mut embedded = Vec::with_capacity(chunks.len());

		// Every vector is fetched and checked before the store is touched.
		for batch in chunks.chunks(batch_size) {
			let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
			let vectors =
				self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await?;

			if vectors.len() != batch.len() {
				return Err(Error::Provider {
					message: format!(
						"Embedding provider returned {} vectors for {} inputs.",
						vectors.len(),
						batch.len()
					),
				});
			}

			for (chunk, vec) in batch.iter().zip(vectors) {
				self.check_embedding(&vec)?;

				let doc = DocumentChunk::new(chunk.text.as_str(), source, chunk.chunk_id);

				embedded.push((doc, vec));
			}

			tracing::debug!(source, embedded = batch.len(), "Embedded chunk batch.");
		}

		let replaced = if replace { self.store.delete_source(source).await? } else { 0 };

		for (doc, vec) in &embedded {
			self.store.insert_document(doc, vec).await?;
		}

		tracing::info!(source, chunks = chunks.len(), replaced, "Ingested document.");

		Ok(IngestReport { source: source.to_string(), chunks: chunks.len(), replaced })
	}
}
