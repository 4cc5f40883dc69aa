use std::fmt::Write;

use tracing::{info, warn};

use crate::llm::ChatModel;
use crate::query::prompts::{self, OPTIMIZABLE_PROMPTS, OPTIMIZER_PROMPT};

use super::judge::{Evaluation, EvaluationRecord};

pub const DEFAULT_THRESHOLD: f64 = 0.9;
/// Keeps the optimizer prompt within a reasonable size.
const MAX_CASES: usize = 5;
const OPTIMIZER_TEMPERATURE: f32 = 0.5;

const ALL_GOOD: &str = "所有案例表現良好，無需優化！";

/// Cases where either score is below `threshold`. Records whose evaluation
/// failed carry no score and are not counted.
pub fn poor_cases(report: &[EvaluationRecord], threshold: f64) -> Vec<&EvaluationRecord> {
    let cases: Vec<_> = report
        .iter()
        .filter(|r| match &r.evaluation {
            Evaluation::Scored(s) => s.accuracy_score < threshold || s.completeness_score < threshold,
            Evaluation::Error { .. } => false,
        })
        .collect();
    info!(poor = cases.len(), total = report.len(), threshold, "Filtered poorly performing cases");
    cases
}

/// Human-readable digest of the first few failures for the optimizer prompt.
pub fn failure_analysis(cases: &[&EvaluationRecord]) -> String {
    let mut out = String::new();
    for (i, case) in cases.iter().take(MAX_CASES).enumerate() {
        let verdict = serde_json::to_string(&case.evaluation).unwrap_or_default();
        let _ = write!(
            out,
            "--- 失敗案例 {} ---\n問題: {}\n黃金答案 (期望的): {}\n系統的錯誤答案: {}\nAI評審員的評語: {}\n\n",
            i + 1,
            case.result.question,
            case.result.golden_answer,
            case.result.actual_answer,
            verdict
        );
    }
    out
}

/// Suggestions for one prompt. Model failures are reported inline rather
/// than aborting the whole report.
pub async fn suggest(model: &dyn ChatModel, prompt: &str, cases: &[&EvaluationRecord]) -> String {
    if cases.is_empty() {
        return ALL_GOOD.to_string();
    }

    let analysis = failure_analysis(cases);
    let request = prompts::render(OPTIMIZER_PROMPT, &[("prompt", prompt), ("cases", analysis.as_str())]);
    match model.complete(&request, Some(OPTIMIZER_TEMPERATURE)).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %format!("{:#}", e), "Prompt suggestion failed");
            format!("生成建議失敗: {:#}", e)
        }
    }
}

/// One section per optimizable prompt, separated by horizontal rules.
pub async fn build_report(model: &dyn ChatModel, cases: &[&EvaluationRecord]) -> String {
    let mut sections = Vec::with_capacity(OPTIMIZABLE_PROMPTS.len());
    for (name, template) in OPTIMIZABLE_PROMPTS {
        info!(prompt = name, "Analyzing prompt");
        let suggestion = suggest(model, template, cases).await;
        sections.push(format!("# {} - 優化報告\n\n{}", name, suggestion.trim()));
    }
    sections.join("\n\n---\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::judge::Score;
    use crate::harness::runner::TestResult;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn record(q: &str, accuracy: f64, completeness: f64) -> EvaluationRecord {
        EvaluationRecord {
            result: TestResult {
                question: q.to_string(),
                golden_answer: "golden".to_string(),
                actual_answer: "actual".to_string(),
            },
            evaluation: Evaluation::Scored(Score {
                accuracy_score: accuracy,
                completeness_score: completeness,
                explanation: "why".to_string(),
            }),
        }
    }

    fn errored(q: &str) -> EvaluationRecord {
        EvaluationRecord {
            evaluation: Evaluation::Error {
                error: "boom".to_string(),
            },
            ..record(q, 0.0, 0.0)
        }
    }

    #[derive(Default)]
    struct FakeOptimizer {
        requests: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatModel for FakeOptimizer {
        async fn complete(&self, prompt: &str, temperature: Option<f32>) -> Result<String> {
            assert_eq!(temperature, Some(OPTIMIZER_TEMPERATURE));
            self.requests.lock().unwrap().push(prompt.to_string());
            if self.fail {
                anyhow::bail!("quota exceeded");
            }
            Ok("### 1. 問題根源分析\n...\n".to_string())
        }
    }

    #[test]
    fn poor_cases_use_either_score_and_skip_errors() {
        let report = vec![
            record("ok", 0.95, 1.0),
            record("inaccurate", 0.5, 1.0),
            record("incomplete", 1.0, 0.89),
            errored("errored"),
            record("edge", 0.9, 0.9),
        ];
        let poor: Vec<_> = poor_cases(&report, DEFAULT_THRESHOLD)
            .iter()
            .map(|r| r.result.question.as_str())
            .collect();
        assert_eq!(poor, vec!["inaccurate", "incomplete"]);
    }

    #[test]
    fn failure_analysis_caps_cases() {
        let report: Vec<_> = (0..7).map(|i| record(&format!("q{}", i), 0.1, 0.1)).collect();
        let cases: Vec<&EvaluationRecord> = report.iter().collect();
        let text = failure_analysis(&cases);
        assert!(text.contains("--- 失敗案例 5 ---"));
        assert!(!text.contains("--- 失敗案例 6 ---"));
        assert!(text.contains("問題: q0\n黃金答案 (期望的): golden\n系統的錯誤答案: actual\n"));
        assert!(text.contains("\"accuracy_score\":0.1"));
    }

    #[tokio::test]
    async fn report_has_one_section_per_prompt() {
        let model = FakeOptimizer::default();
        let report = vec![record("q", 0.2, 0.3)];
        let cases: Vec<&EvaluationRecord> = report.iter().collect();

        let text = build_report(&model, &cases).await;
        assert!(text.starts_with("# Extractor Prompt (第一階段：文字提取) - 優化報告\n\n### 1."));
        assert!(text.contains("\n\n---\n\n# Synthesizer Prompt (第二階段：結果整合) - 優化報告"));

        let requests = model.requests.lock().unwrap();
        assert_eq!(requests.len(), OPTIMIZABLE_PROMPTS.len());
        assert!(requests[0].contains(prompts::NOT_FOUND_SENTINEL));
        assert!(requests[0].contains("--- 失敗案例 1 ---"));
    }

    #[tokio::test]
    async fn model_failure_is_reported_inline() {
        let model = FakeOptimizer {
            fail: true,
            ..Default::default()
        };
        let report = vec![record("q", 0.2, 0.3)];
        let cases: Vec<&EvaluationRecord> = report.iter().collect();
        let text = suggest(&model, "prompt", &cases).await;
        assert_eq!(text, "生成建議失敗: quota exceeded");
    }

    #[tokio::test]
    async fn no_cases_needs_no_model_call() {
        let model = FakeOptimizer::default();
        assert_eq!(suggest(&model, "prompt", &[]).await, ALL_GOOD);
        assert!(model.requests.lock().unwrap().is_empty());
    }
}
