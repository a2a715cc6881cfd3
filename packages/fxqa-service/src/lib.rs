pub mod agent;
pub mod answer;
pub mod ingest;
pub mod planner;
pub mod rerank;
pub mod retrieve;
pub mod store;
pub mod verify;

mod error;

pub use agent::{AskRequest, AskResponse, LOW_CONFIDENCE_ANSWER, Memory, OUT_OF_SCOPE_ANSWER};
pub use answer::INSUFFICIENT_CONTEXT_ANSWER;
pub use error::{Error, Result};
pub use fxqa_providers::generation::Sampling;
pub use ingest::IngestReport;
pub use retrieve::RetrievalMode;
pub use store::PgDocumentStore;

use std::{future::Future, pin::Pin, sync::Arc};

use fxqa_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use fxqa_domain::chunk::DocumentChunk;
use fxqa_providers::{embedding, generation};
use fxqa_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

/// One prompt in, one completion out. Shared by the planner, the judges, and the answer step.
pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
		sampling: Sampling,
	) -> BoxFuture<'a, Result<String>>;
}

/// The chunk store behind retrieval and ingestion. Every lookup returns rows in the store's own
/// ranking order.
pub trait DocumentStore
where
	Self: Send + Sync,
{
	fn match_documents<'a>(
		&'a self,
		query_embedding: &'a [f32],
		match_count: u32,
	) -> BoxFuture<'a, Result<Vec<DocumentChunk>>>;

	fn hybrid_match_documents<'a>(
		&'a self,
		query_embedding: &'a [f32],
		query_text: &'a str,
		match_count: u32,
	) -> BoxFuture<'a, Result<Vec<DocumentChunk>>>;

	fn text_search<'a>(
		&'a self,
		query_text: &'a str,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<DocumentChunk>>>;

	fn insert_document<'a>(
		&'a self,
		chunk: &'a DocumentChunk,
		embedding: &'a [f32],
	) -> BoxFuture<'a, Result<()>>;

	fn delete_source<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<u64>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generation: Arc<dyn GenerationProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		generation: Arc<dyn GenerationProvider>,
	) -> Self {
		Self { embedding, generation }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), generation: provider }
	}
}

pub struct FxService {
	pub cfg: Config,
	pub store: Arc<dyn DocumentStore>,
	pub providers: Providers,
}
impl FxService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, store: Arc::new(PgDocumentStore::new(db)), providers: Providers::default() }
	}

	pub fn with_parts(cfg: Config, store: Arc<dyn DocumentStore>, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}

	pub(crate) async fn generate(&self, prompt: &str, sampling: Sampling) -> Result<String> {
		self.providers.generation.generate(&self.cfg.providers.llm, prompt, sampling).await
	}

	/// Embedding vectors must be non-empty, finite, and match the configured dimension before
	/// they reach the store.
	pub(crate) fn check_embedding(&self, vec: &[f32]) -> Result<()> {
		let expected = self.cfg.providers.embedding.dimensions as usize;

		if vec.is_empty() {
			return Err(Error::Provider {
				message: "Embedding provider returned an empty vector.".to_string(),
			});
		}
		if vec.len() != expected {
			return Err(Error::Provider {
				message: format!(
					"Embedding dimension mismatch. Expected {expected}, got {}.",
					vec.len()
				),
			});
		}
		if vec.iter().any(|value| !value.is_finite()) {
			return Err(Error::Provider {
				message: "Embedding provider returned a non-finite value.".to_string(),
			});
		}

		Ok(())
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { embedding::embed(cfg, texts).await.map_err(Error::from) })
	}
}

impl GenerationProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		prompt: &'a str,
		sampling: Sampling,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			generation::generate(cfg, prompt, sampling).await.map_err(Error::from)
		})
	}
}
