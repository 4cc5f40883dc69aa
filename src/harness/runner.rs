use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::llm::preview;
use crate::query::QueryEngine;

use super::dataset::QaPair;
use super::{run_batched, BatchOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub question: String,
    #[serde(default)]
    pub golden_answer: String,
    #[serde(default)]
    pub actual_answer: String,
}

/// Ask every question through the engine. Pairs with a blank question are skipped.
pub async fn run_tests(engine: &QueryEngine, pairs: Vec<QaPair>, opts: BatchOptions) -> Vec<TestResult> {
    let total = pairs.len();
    info!(total, batch_size = opts.size, "Running test questions");

    let results = run_batched(pairs, opts, |i, pair| async move {
        if pair.question.trim().is_empty() {
            return None;
        }

        let started = Instant::now();
        let actual_answer = engine.process_query(&pair.question).await;
        info!(
            test = i + 1,
            total,
            question = %preview(&pair.question, 50),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Test answered"
        );

        Some(TestResult {
            question: pair.question,
            golden_answer: pair.golden_answer,
            actual_answer,
        })
    })
    .await;

    results.into_iter().flatten().collect()
}
