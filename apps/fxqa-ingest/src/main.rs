use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = fxqa_ingest::Args::parse();

	fxqa_ingest::run(args).await
}
