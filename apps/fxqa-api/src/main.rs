use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = fxqa_api::Args::parse();

	fxqa_api::run(args).await
}
