use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use fxqa_domain::{
	chunk::{ChunkMetadata, DocumentChunk},
	metrics,
};
use fxqa_service::FxService;
use fxqa_storage::db::Db;

/// Measures retrieval recall and rerank precision against labeled chunks.
#[derive(Debug, Parser)]
#[command(
	version = fxqa_cli::VERSION,
	rename_all = "kebab",
	styles = fxqa_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	/// Overrides retrieval.top_k.
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
	/// Overrides retrieval.candidate_k.
	#[arg(long, value_name = "N")]
	pub candidate_k: Option<u32>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EvalCase {
	pub query: String,
	#[serde(default)]
	pub relevant_chunks: Vec<ChunkMetadata>,
}

#[derive(Debug, Serialize)]
pub struct EvalOutput {
	pub dataset: EvalDatasetInfo,
	pub settings: EvalSettings,
	pub summary: EvalSummary,
	pub queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
pub struct EvalDatasetInfo {
	pub path: String,
	pub case_count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct EvalSettings {
	pub retrieval_mode: String,
	pub candidate_k: u32,
	pub top_k: u32,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct EvalSummary {
	pub evaluated: usize,
	pub skipped: usize,
	pub avg_recall_at_candidate_k: f64,
	pub avg_precision_at_top_k: f64,
}

#[derive(Debug, Serialize)]
pub struct QueryReport {
	pub query: String,
	pub recall_at_candidate_k: f64,
	pub precision_at_top_k: f64,
	pub retrieved: Vec<ChunkMetadata>,
	pub reranked: Vec<ChunkMetadata>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = fxqa_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let settings = EvalSettings {
		retrieval_mode: config.retrieval.mode.clone(),
		candidate_k: args.candidate_k.unwrap_or(config.retrieval.candidate_k),
		top_k: args.top_k.unwrap_or(config.retrieval.top_k),
	};

	if settings.top_k == 0 || settings.candidate_k == 0 {
		return Err(eyre::eyre!("top_k and candidate_k must be greater than zero."));
	}
	if settings.top_k > settings.candidate_k {
		return Err(eyre::eyre!("top_k must be less than or equal to candidate_k."));
	}

	let cases = load_dataset(&args.dataset)?;
	let db = Db::connect(&config.storage.postgres).await?;
	let service = FxService::new(config, db);
	let (summary, queries) = evaluate(&service, &cases, &settings).await?;
	let output = EvalOutput {
		dataset: EvalDatasetInfo {
			path: args.dataset.display().to_string(),
			case_count: cases.len(),
		},
		settings,
		summary,
		queries,
	};

	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

pub fn load_dataset(path: &Path) -> color_eyre::Result<Vec<EvalCase>> {
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read dataset {}.", path.display()))?;
	let cases = serde_json::from_str(&raw)
		.wrap_err_with(|| format!("Failed to parse dataset {}.", path.display()))?;

	Ok(cases)
}

/// Retrieves `candidate_k` chunks per case, reorders all of them with the reranker, then scores
/// recall on the retrieved list and precision on the head of the reranked list.
pub async fn evaluate(
	service: &FxService,
	cases: &[EvalCase],
	settings: &EvalSettings,
) -> fxqa_service::Result<(EvalSummary, Vec<QueryReport>)> {
	let mut reports = Vec::with_capacity(cases.len());
	let mut skipped = 0_usize;

	for case in cases {
		if case.relevant_chunks.is_empty() {
			tracing::info!(query = %case.query, "Skipping case without relevant chunks.");

			skipped += 1;

			continue;
		}

		let retrieved = service.retrieve(&case.query, settings.candidate_k).await?;
		let reranked =
			service.rerank(&case.query, retrieved.clone(), settings.candidate_k).await?;
		let recall = metrics::precision_recall_at_k(
			&retrieved,
			&case.relevant_chunks,
			settings.candidate_k as usize,
		)
		.recall;
		let precision = metrics::precision_recall_at_k(
			&reranked,
			&case.relevant_chunks,
			settings.top_k as usize,
		)
		.precision;

		tracing::info!(
			query = %case.query,
			recall_at_candidate_k = recall,
			precision_at_top_k = precision,
			"Evaluated case."
		);

		reports.push(QueryReport {
			query: case.query.clone(),
			recall_at_candidate_k: recall,
			precision_at_top_k: precision,
			retrieved: metadata_of(&retrieved),
			reranked: metadata_of(&reranked),
		});
	}

	let recalls: Vec<f64> = reports.iter().map(|report| report.recall_at_candidate_k).collect();
	let precisions: Vec<f64> = reports.iter().map(|report| report.precision_at_top_k).collect();
	let summary = EvalSummary {
		evaluated: reports.len(),
		skipped,
		avg_recall_at_candidate_k: metrics::mean(&recalls),
		avg_precision_at_top_k: metrics::mean(&precisions),
	};

	Ok((summary, reports))
}

fn metadata_of(chunks: &[DocumentChunk]) -> Vec<ChunkMetadata> {
	chunks.iter().map(|chunk| chunk.metadata.clone()).collect()
}
