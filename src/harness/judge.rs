use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm::{complete_json, preview, ChatModel};
use crate::query::prompts::{self, JUDGE_PROMPT};

use super::runner::TestResult;
use super::{run_batched, BatchOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// 1.0 when the answer contains nothing wrong or invented.
    pub accuracy_score: f64,
    /// 1.0 when every point of the golden answer is covered.
    pub completeness_score: f64,
    pub explanation: String,
}

impl Score {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("accuracy_score", self.accuracy_score),
            ("completeness_score", self.completeness_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be between 0.0 and 1.0, got {}", name, value);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evaluation {
    Scored(Score),
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    #[serde(flatten)]
    pub result: TestResult,
    pub evaluation: Evaluation,
}

pub async fn evaluate_one(model: &dyn ChatModel, result: TestResult) -> EvaluationRecord {
    let prompt = prompts::render(
        JUDGE_PROMPT,
        &[
            ("question", result.question.as_str()),
            ("golden_answer", result.golden_answer.as_str()),
            ("actual_answer", result.actual_answer.as_str()),
        ],
    );

    let scored = complete_json::<Score>(model, &prompt, None)
        .await
        .and_then(|score| score.validate().map(|_| score));

    let evaluation = match scored {
        Ok(score) => Evaluation::Scored(score),
        Err(e) => {
            warn!(question = %preview(&result.question, 20), error = %format!("{:#}", e), "Evaluation failed");
            Evaluation::Error {
                error: format!("{:#}", e),
            }
        }
    };

    EvaluationRecord { result, evaluation }
}

/// Score every test result with the judge model, in paced batches.
pub async fn evaluate_all(
    model: &dyn ChatModel,
    results: Vec<TestResult>,
    opts: BatchOptions,
) -> Vec<EvaluationRecord> {
    info!(total = results.len(), batch_size = opts.size, "Evaluating test results");
    let records = run_batched(results, opts, |_, result| evaluate_one(model, result)).await;

    let errors = records
        .iter()
        .filter(|r| matches!(r.evaluation, Evaluation::Error { .. }))
        .count();
    info!(total = records.len(), errors, "Evaluation complete");
    records
}
