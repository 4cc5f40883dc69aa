mod ask;
mod evaluate;
mod generate;
mod optimize;
mod run_tests;
mod sections;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::harness::BatchOptions;

/// SOP document assistant: query worksheet sections, and evaluate the answers.
#[derive(Parser, Debug)]
#[command(name = "sop-query", version)]
pub struct Cli {
    /// Document to search (overrides SOP_DOCUMENT)
    #[arg(long, global = true)]
    pub document: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a question, or start an interactive session
    Ask(ask::AskArgs),
    /// List the sections loaded from the document
    Sections(sections::SectionsArgs),
    /// Generate a Q/A test dataset from the document
    Generate(generate::GenerateArgs),
    /// Run the test dataset through the query pipeline
    RunTests(run_tests::RunTestsArgs),
    /// Score test results against the golden answers
    Evaluate(evaluate::EvaluateArgs),
    /// Turn poorly scored cases into prompt improvement suggestions
    Optimize(optimize::OptimizeArgs),
}

/// Pacing for commands that call the model many times.
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// Items processed concurrently per batch
    #[arg(long, default_value_t = 5)]
    pub batch_size: usize,

    /// Pause between batches, in seconds
    #[arg(long, default_value_t = 0.0)]
    pub delay_secs: f64,
}

impl From<BatchArgs> for BatchOptions {
    fn from(args: BatchArgs) -> Self {
        Self {
            size: args.batch_size,
            delay: Duration::try_from_secs_f64(args.delay_secs).unwrap_or(Duration::ZERO),
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = AppConfig::from_env()?;
        if let Some(path) = self.document {
            config.document.path = path;
        }

        match self.command {
            Command::Ask(args) => ask::run(&config, args).await,
            Command::Sections(args) => sections::run(&config, args),
            Command::Generate(args) => generate::run(&config, args).await,
            Command::RunTests(args) => run_tests::run(&config, args).await,
            Command::Evaluate(args) => evaluate::run(&config, args).await,
            Command::Optimize(args) => optimize::run(&config, args).await,
        }
    }
}
