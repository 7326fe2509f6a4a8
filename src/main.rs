//! `cognito-stack` command-line entry point.

// crates.io
use clap::Parser;
// self
use cognito_stack::{
	cli::{self, Cli},
	obs,
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let cli = Cli::parse();

	obs::init_subscriber(cli.verbose);

	cli::run(cli).await
}
