use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::extract::ExtractionResult;
use super::keywords::ParsedQuery;
use super::oracle::{SynthesisInput, SynthesisOracle};

const SPAN_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    /// No extraction found anything; the synthesis oracle was not called.
    NotFound,
    Answer(String),
}

pub struct ResultSynthesizer {
    oracle: Arc<dyn SynthesisOracle>,
}

impl ResultSynthesizer {
    pub fn new(oracle: Arc<dyn SynthesisOracle>) -> Self {
        Self { oracle }
    }

    pub async fn synthesize(
        &self,
        parsed: &ParsedQuery,
        results: &[ExtractionResult],
    ) -> Result<Synthesis> {
        let spans: Vec<&str> = results
            .iter()
            .filter(|r| r.found)
            .map(|r| r.text.as_str())
            .collect();
        if spans.is_empty() {
            return Ok(Synthesis::NotFound);
        }

        info!(spans = spans.len(), "Synthesizing extracted spans");
        let combined = spans.join(SPAN_SEPARATOR);
        let subjects = parsed.subjects_joined();
        let descriptors = parsed.descriptors_joined();

        let answer = self
            .oracle
            .synthesize(SynthesisInput {
                subjects: &subjects,
                descriptors: &descriptors,
                combined_spans: &combined,
            })
            .await?;

        Ok(Synthesis::Answer(answer.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOracle {
        inputs: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SynthesisOracle for RecordingOracle {
        async fn synthesize(&self, input: SynthesisInput<'_>) -> Result<String> {
            self.inputs
                .lock()
                .unwrap()
                .push(input.combined_spans.to_string());
            Ok("\n 1. 鹽 每日需過篩 \n".to_string())
        }
    }

    fn parsed() -> ParsedQuery {
        ParsedQuery {
            subjects: ["鹽".to_string()].into_iter().collect(),
            descriptors: BTreeSet::new(),
        }
    }

    fn result(text: &str, found: bool) -> ExtractionResult {
        ExtractionResult {
            section_title: "t".to_string(),
            text: text.to_string(),
            found,
        }
    }

    #[tokio::test]
    async fn nothing_found_short_circuits() {
        let oracle = Arc::new(RecordingOracle::default());
        let synth = ResultSynthesizer::new(oracle.clone());

        let out = synth
            .synthesize(&parsed(), &[result("NO_DIRECT_CONTENT_FOUND", false), result("LLM 提取失敗", false)])
            .await
            .unwrap();
        assert_eq!(out, Synthesis::NotFound);

        let out = synth.synthesize(&parsed(), &[]).await.unwrap();
        assert_eq!(out, Synthesis::NotFound);
        assert!(oracle.inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn found_spans_are_joined_and_answer_trimmed() {
        let oracle = Arc::new(RecordingOracle::default());
        let synth = ResultSynthesizer::new(oracle.clone());

        let out = synth
            .synthesize(
                &parsed(),
                &[result("鹽 每日需過篩", true), result("ignored", false), result("鹽 保持乾燥", true)],
            )
            .await
            .unwrap();
        assert_eq!(out, Synthesis::Answer("1. 鹽 每日需過篩".to_string()));

        let inputs = oracle.inputs.lock().unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0], "鹽 每日需過篩\n\n---\n\n鹽 保持乾燥");
    }
}
