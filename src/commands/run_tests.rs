use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::harness::dataset::QaPair;
use crate::harness::{read_json, runner, write_json};
use crate::query::QueryEngine;

use super::BatchArgs;

#[derive(Args, Debug)]
pub struct RunTestsArgs {
    /// Dataset produced by `generate`
    #[arg(long, default_value = "test_dataset.json")]
    pub dataset: PathBuf,

    /// Where to write the answers
    #[arg(long, default_value = "test_results.json")]
    pub output: PathBuf,

    #[command(flatten)]
    pub batch: BatchArgs,
}

pub async fn run(config: &AppConfig, args: RunTestsArgs) -> Result<()> {
    let pairs: Vec<QaPair> = read_json(&args.dataset)
        .with_context(|| format!("Run `generate` first to create {}", args.dataset.display()))?;
    info!(count = pairs.len(), path = %args.dataset.display(), "Dataset loaded");

    let engine = QueryEngine::from_config(config).context("Query engine failed to initialize")?;
    let results = runner::run_tests(&engine, pairs, args.batch.into()).await;

    write_json(&args.output, &results)?;
    println!("Ran {} tests -> {}", results.len(), args.output.display());
    Ok(())
}
