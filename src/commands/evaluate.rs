use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::AppConfig;
use crate::harness::runner::TestResult;
use crate::harness::{judge, read_json, write_json};
use crate::llm::LlmClient;

use super::BatchArgs;

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Results produced by `run-tests`
    #[arg(long, default_value = "test_results.json")]
    pub input: PathBuf,

    /// Where to write the scored report
    #[arg(long, default_value = "evaluation_report.json")]
    pub output: PathBuf,

    #[command(flatten)]
    pub batch: BatchArgs,
}

pub async fn run(config: &AppConfig, args: EvaluateArgs) -> Result<()> {
    let llm = LlmClient::new(&config.llm).context("LLM client failed to initialize")?;
    let results: Vec<TestResult> = read_json(&args.input)
        .with_context(|| format!("Run `run-tests` first to create {}", args.input.display()))?;

    let records = judge::evaluate_all(&llm, results, args.batch.into()).await;

    write_json(&args.output, &records)?;
    println!("Evaluated {} results -> {}", records.len(), args.output.display());
    Ok(())
}
