use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::docs::types::Section;
use crate::llm::{complete_json, ChatModel};
use crate::query::prompts::{self, QA_GENERATION_PROMPT};

/// Some variety between runs keeps the generated questions from repeating.
const GENERATION_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub golden_answer: String,
}

#[derive(Debug, Deserialize)]
struct QaDataset {
    qa_pairs: Vec<QaPair>,
}

/// Ask the model for one or two Q/A pairs per section, all sections at once.
/// Sections whose call fails or returns malformed JSON contribute nothing.
pub async fn generate(model: &dyn ChatModel, sections: &[Section]) -> Vec<QaPair> {
    info!(sections = sections.len(), "Generating Q/A pairs");

    let tasks = sections.iter().map(|section| async move {
        let prompt = prompts::render(QA_GENERATION_PROMPT, &[("section", section.content.as_str())]);
        match complete_json::<QaDataset>(model, &prompt, Some(GENERATION_TEMPERATURE)).await {
            Ok(dataset) => dataset.qa_pairs,
            Err(e) => {
                warn!(section = %section.title, error = %format!("{:#}", e), "Q/A generation failed");
                vec![]
            }
        }
    });

    let pairs: Vec<QaPair> = join_all(tasks)
        .await
        .into_iter()
        .flatten()
        .filter(|p| !p.question.trim().is_empty())
        .collect();

    info!(count = pairs.len(), "Q/A pairs generated");
    pairs
}
