mod commands;
mod config;
mod docs;
mod error;
mod harness;
mod llm;
mod query;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load env before the filter reads RUST_LOG
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    Cli::parse().run().await
}
