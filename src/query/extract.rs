use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::docs::types::Section;

use super::keywords::ParsedQuery;
use super::oracle::{ExtractionInput, ExtractionOracle};
use super::prompts::NOT_FOUND_SENTINEL;

/// Text recorded for a section whose oracle call failed.
pub const EXTRACTION_FAILED: &str = "LLM 提取失敗";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub section_title: String,
    pub text: String,
    pub found: bool,
}

pub struct SpanExtractor {
    oracle: Arc<dyn ExtractionOracle>,
}

impl SpanExtractor {
    pub fn new(oracle: Arc<dyn ExtractionOracle>) -> Self {
        Self { oracle }
    }

    /// One oracle call per candidate, all in flight together. The output has
    /// exactly one entry per candidate, in candidate order, whatever fails.
    pub async fn extract_all(
        &self,
        candidates: &[&Section],
        parsed: &ParsedQuery,
    ) -> Vec<ExtractionResult> {
        let subjects = parsed.subjects_joined();
        let descriptors = parsed.descriptors_joined();

        let tasks = candidates
            .iter()
            .map(|section| self.extract_one(section, &subjects, &descriptors));
        join_all(tasks).await
    }

    async fn extract_one(
        &self,
        section: &Section,
        subjects: &str,
        descriptors: &str,
    ) -> ExtractionResult {
        let input = ExtractionInput {
            subjects,
            descriptors,
            content: &section.content,
        };

        match self.oracle.extract(input).await {
            Ok(raw) => {
                let text = raw.trim().to_string();
                let found = !text.is_empty() && !text.contains(NOT_FOUND_SENTINEL);
                debug!(section = %section.title, found, "Extraction finished");
                ExtractionResult {
                    section_title: section.title.clone(),
                    text,
                    found,
                }
            }
            Err(e) => {
                warn!(section = %section.title, error = %format!("{:#}", e), "Extraction failed");
                ExtractionResult {
                    section_title: section.title.clone(),
                    text: EXTRACTION_FAILED.to_string(),
                    found: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    /// Replies keyed by section content; unknown content is an error.
    struct ScriptedOracle {
        replies: Vec<(&'static str, &'static str)>,
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ExtractionOracle for ScriptedOracle {
        async fn extract(&self, input: ExtractionInput<'_>) -> Result<String> {
            self.seen
                .lock()
                .unwrap()
                .push((input.subjects.to_string(), input.descriptors.to_string()));
            // finish later sections first so completion order differs from input order
            let delay = 30u64.saturating_sub(input.content.len() as u64);
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            self.replies
                .iter()
                .find(|(content, _)| *content == input.content)
                .map(|(_, reply)| reply.to_string())
                .ok_or_else(|| anyhow::anyhow!("transport error"))
        }
    }

    fn parsed() -> ParsedQuery {
        ParsedQuery {
            subjects: ["糖", "鹽"].iter().map(|s| s.to_string()).collect(),
            descriptors: ["結塊"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[tokio::test]
    async fn failures_are_isolated_and_order_is_kept() {
        let oracle = Arc::new(ScriptedOracle {
            replies: vec![
                ("a", "  鹽 每日需過篩 \n"),
                ("bb", "NO_DIRECT_CONTENT_FOUND"),
                ("ccc", "   "),
                ("eeeee", "糖 先於鹽加入"),
            ],
            seen: Mutex::new(vec![]),
        });
        let extractor = SpanExtractor::new(oracle.clone());

        let sections = vec![
            Section::new("s1", "a"),
            Section::new("s2", "bb"),
            Section::new("s3", "ccc"),
            Section::new("s4", "dddd"),
            Section::new("s5", "eeeee"),
        ];
        let candidates: Vec<&Section> = sections.iter().collect();

        let results = extractor.extract_all(&candidates, &parsed()).await;

        assert_eq!(results.len(), candidates.len());
        let titles: Vec<_> = results.iter().map(|r| r.section_title.as_str()).collect();
        assert_eq!(titles, vec!["s1", "s2", "s3", "s4", "s5"]);

        assert!(results[0].found);
        assert_eq!(results[0].text, "鹽 每日需過篩");
        assert!(!results[1].found);
        assert!(!results[2].found);
        assert!(!results[3].found);
        assert_eq!(results[3].text, EXTRACTION_FAILED);
        assert!(results[4].found);

        let seen = oracle.seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert!(seen.iter().all(|(s, d)| s == "糖、鹽" && d == "結塊"));
    }

    #[tokio::test]
    async fn sentinel_inside_longer_text_counts_as_not_found() {
        let oracle = Arc::new(ScriptedOracle {
            replies: vec![("x", "抱歉 NO_DIRECT_CONTENT_FOUND。")],
            seen: Mutex::new(vec![]),
        });
        let sections = vec![Section::new("only", "x")];
        let candidates: Vec<&Section> = sections.iter().collect();
        let results = SpanExtractor::new(oracle)
            .extract_all(&candidates, &parsed())
            .await;
        assert_eq!(results.len(), 1);
        assert!(!results[0].found);
    }

    #[tokio::test]
    async fn every_call_failing_still_yields_one_result_each() {
        let oracle = Arc::new(ScriptedOracle {
            replies: vec![],
            seen: Mutex::new(vec![]),
        });
        let sections: Vec<Section> = (0..8)
            .map(|i| Section::new(format!("t{}", i), format!("c{}", i)))
            .collect();
        let candidates: Vec<&Section> = sections.iter().collect();
        let results = SpanExtractor::new(oracle)
            .extract_all(&candidates, &parsed())
            .await;
        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| !r.found && r.text == EXTRACTION_FAILED));
    }
}
