use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::llm::ChatModel;

use super::prompts::{self, EXTRACTION_PROMPT, SYNTHESIS_PROMPT};

#[derive(Debug, Clone, Copy)]
pub struct ExtractionInput<'a> {
    pub subjects: &'a str,
    pub descriptors: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    pub subjects: &'a str,
    pub descriptors: &'a str,
    pub combined_spans: &'a str,
}

/// Returns the verbatim relevant span of one section, or the not-found sentinel.
#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    async fn extract(&self, input: ExtractionInput<'_>) -> Result<String>;
}

/// Merges extracted spans into one deduplicated, numbered list.
#[async_trait]
pub trait SynthesisOracle: Send + Sync {
    async fn synthesize(&self, input: SynthesisInput<'_>) -> Result<String>;
}

/// Both oracles backed by the chat model.
pub struct LlmOracle {
    llm: Arc<dyn ChatModel>,
}

impl LlmOracle {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ExtractionOracle for LlmOracle {
    async fn extract(&self, input: ExtractionInput<'_>) -> Result<String> {
        let prompt = prompts::render(
            EXTRACTION_PROMPT,
            &[
                ("subjects", input.subjects),
                ("descriptors", input.descriptors),
                ("content", input.content),
            ],
        );
        self.llm.complete(&prompt, None).await
    }
}

#[async_trait]
impl SynthesisOracle for LlmOracle {
    async fn synthesize(&self, input: SynthesisInput<'_>) -> Result<String> {
        let prompt = prompts::render(
            SYNTHESIS_PROMPT,
            &[
                ("subjects", input.subjects),
                ("descriptors", input.descriptors),
                ("spans", input.combined_spans),
            ],
        );
        self.llm.complete(&prompt, None).await
    }
}
