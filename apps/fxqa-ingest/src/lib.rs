use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use tracing_subscriber::EnvFilter;

use fxqa_service::FxService;
use fxqa_storage::db::Db;

/// Chunks, embeds, and stores UTF-8 text files as disclosure documents.
#[derive(Debug, Parser)]
#[command(
	version = fxqa_cli::VERSION,
	rename_all = "kebab",
	styles = fxqa_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Source recorded in chunk metadata. Defaults to the file path. Only valid with one file.
	#[arg(long, value_name = "NAME")]
	pub source_name: Option<String>,
	/// Delete the source's existing chunks before inserting the new ones.
	#[arg(long)]
	pub replace: bool,
	#[arg(value_name = "FILE", required = true, num_args = 1..)]
	pub files: Vec<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	if args.source_name.is_some() && args.files.len() > 1 {
		return Err(eyre::eyre!("--source-name can only be used with a single file."));
	}

	let config = fxqa_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.providers.embedding.dimensions).await?;

	let service = FxService::new(config, db);
	let mut reports = Vec::with_capacity(args.files.len());

	for path in &args.files {
		let text = fs::read_to_string(path)
			.wrap_err_with(|| format!("Failed to read {} as UTF-8 text.", path.display()))?;
		let source = source_name(args.source_name.as_deref(), path);

		tracing::info!(path = %path.display(), %source, replace = args.replace, "Ingesting file.");

		let report = service.ingest_text(&text, &source, args.replace).await?;

		reports.push(report);
	}

	println!("{}", serde_json::to_string_pretty(&reports)?);

	Ok(())
}

pub fn source_name(explicit: Option<&str>, path: &Path) -> String {
	match explicit.map(str::trim).filter(|name| !name.is_empty()) {
		Some(name) => name.to_string(),
		None => path.display().to_string(),
	}
}
