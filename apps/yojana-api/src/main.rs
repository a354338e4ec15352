use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = yojana_api::Args::parse();

	yojana_api::run(args).await
}
