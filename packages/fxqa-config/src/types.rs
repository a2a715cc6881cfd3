use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub agent: Agent,
	#[serde(default)]
	pub chunking: Chunking,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	/// Number of chunk texts sent per embedding request during ingestion.
	#[serde(default = "default_embedding_batch_size")]
	pub batch_size: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Serves both the answer generator and the deterministic judges (planner, reranker,
/// groundedness verifier).
#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	/// Sampling temperature for answer generation. Left to the provider default when unset.
	pub temperature: Option<f32>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	/// One of "hybrid", "dense", or "sparse".
	pub mode: String,
	/// Candidates fetched from the store before reranking.
	pub candidate_k: u32,
	/// Candidates kept after reranking.
	pub top_k: u32,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { mode: "hybrid".to_string(), candidate_k: 10, top_k: 3 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Agent {
	/// When false, every query runs the fixed retrieve-then-answer plan without a planner call.
	pub planner_enabled: bool,
}
impl Default for Agent {
	fn default() -> Self {
		Self { planner_enabled: true }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Chunking {
	pub max_chars: u32,
	pub overlap_chars: u32,
}
impl Default for Chunking {
	fn default() -> Self {
		Self { max_chars: 800, overlap_chars: 100 }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_embedding_batch_size() -> u32 {
	16
}
