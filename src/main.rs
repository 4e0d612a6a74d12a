use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod config;
mod error;

use cli::Cli;
use error::DocdiffError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the diffs
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting docdiff v{}", env!("CARGO_PKG_VERSION"));

    let result = cli.execute().await;
    if let Err(e) = &result {
        if e.downcast_ref::<DocdiffError>().is_some_and(DocdiffError::is_fatal) {
            error!("Aborting run: {}", e);
        }
    }
    result
}
