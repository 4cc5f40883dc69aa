use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::harness::judge::EvaluationRecord;
use crate::harness::optimize::{self, DEFAULT_THRESHOLD};
use crate::harness::read_json;
use crate::llm::LlmClient;

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Report produced by `evaluate`
    #[arg(long, default_value = "evaluation_report.json")]
    pub input: PathBuf,

    /// Where to write the Markdown report
    #[arg(long, default_value = "prompt_optimization_report_full.md")]
    pub output: PathBuf,

    /// Cases scoring below this on accuracy or completeness are analyzed
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,
}

pub async fn run(config: &AppConfig, args: OptimizeArgs) -> Result<()> {
    let llm = LlmClient::new(&config.llm).context("LLM client failed to initialize")?;
    let report: Vec<EvaluationRecord> = read_json(&args.input)
        .with_context(|| format!("Run `evaluate` first to create {}", args.input.display()))?;

    let cases = optimize::poor_cases(&report, args.threshold);
    if cases.is_empty() {
        println!("All {} cases scored at or above {}; nothing to optimize.", report.len(), args.threshold);
        return Ok(());
    }

    let text = optimize::build_report(&llm, &cases).await;
    std::fs::write(&args.output, text)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(cases = cases.len(), path = %args.output.display(), "Optimization report saved");
    println!("Analyzed {} cases -> {}", cases.len(), args.output.display());
    Ok(())
}
