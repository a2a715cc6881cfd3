use clap::Parser;

use fxqa_eval::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	fxqa_eval::run(args).await
}
