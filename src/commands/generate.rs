use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::docs::SectionStore;
use crate::harness::{dataset, write_json};
use crate::llm::LlmClient;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Where to write the dataset
    #[arg(long, default_value = "test_dataset.json")]
    pub output: PathBuf,
}

pub async fn run(config: &AppConfig, args: GenerateArgs) -> Result<()> {
    let llm = LlmClient::new(&config.llm).context("LLM client failed to initialize")?;

    // every section, not only the allow-listed ones
    let doc = &config.document;
    let sections = SectionStore::load(&doc.path, &doc.section_marker)?;
    if sections.is_empty() {
        anyhow::bail!("No sections found in {}", doc.path.display());
    }

    let pairs = dataset::generate(&llm, &sections).await;
    if pairs.is_empty() {
        anyhow::bail!("The model did not produce any Q/A pairs");
    }

    write_json(&args.output, &pairs)?;
    info!(count = pairs.len(), path = %args.output.display(), "Dataset saved");
    println!("Generated {} Q/A pairs -> {}", pairs.len(), args.output.display());
    Ok(())
}
