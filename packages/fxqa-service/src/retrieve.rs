use fxqa_domain::chunk::DocumentChunk;

use crate::{Error, FxService, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetrievalMode {
	/// Dense and full-text ranks fused in one store query.
	Hybrid,
	Dense,
	/// Full-text only. Skips the embedding call.
	Sparse,
}
impl RetrievalMode {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"hybrid" => Some(Self::Hybrid),
			"dense" => Some(Self::Dense),
			"sparse" => Some(Self::Sparse),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Hybrid => "hybrid",
			Self::Dense => "dense",
			Self::Sparse => "sparse",
		}
	}
}

impl FxService {
	/// Fetches up to `top_k` chunks with the configured retrieval mode, in store ranking order.
	pub async fn retrieve(&self, query: &str, top_k: u32) -> Result<Vec<DocumentChunk>> {
		let mode = RetrievalMode::parse(&self.cfg.retrieval.mode).ok_or_else(|| {
			Error::InvalidRequest {
				message: format!("Unknown retrieval mode {:?}.", self.cfg.retrieval.mode),
			}
		})?;
		let mut chunks = match mode {
			RetrievalMode::Hybrid => self.hybrid_retrieve(query, top_k).await?,
			RetrievalMode::Dense => self.dense_retrieve(query, top_k).await?,
			RetrievalMode::Sparse => self.sparse_retrieve(query, top_k).await?,
		};

		chunks.truncate(top_k as usize);

		tracing::info!(mode = mode.as_str(), top_k, retrieved = chunks.len(), "Retrieved candidates.");

		Ok(chunks)
	}

	pub async fn hybrid_retrieve(&self, query: &str, top_k: u32) -> Result<Vec<DocumentChunk>> {
		let embedding = self.embed_query(query).await?;

		self.store.hybrid_match_documents(&embedding, query, top_k).await
	}

	pub async fn dense_retrieve(&self, query: &str, top_k: u32) -> Result<Vec<DocumentChunk>> {
		let embedding = self.embed_query(query).await?;

		self.store.match_documents(&embedding, top_k).await
	}

	pub async fn sparse_retrieve(&self, query: &str, top_k: u32) -> Result<Vec<DocumentChunk>> {
		self.store.text_search(query, top_k).await
	}

	async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
		let texts = [query.to_string()];
		let embedded =
			self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await?;
		let Some(vec) = embedded.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		self.check_embedding(&vec)?;

		Ok(vec)
	}
}
