pub mod extract;
pub mod keywords;
pub mod oracle;
pub mod prompts;
pub mod select;
pub mod synth;

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use futures::FutureExt;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::docs::SectionStore;
use crate::error::InitError;
use crate::llm::LlmClient;

use extract::SpanExtractor;
use keywords::KeywordExtractor;
use oracle::{ExtractionOracle, LlmOracle, SynthesisOracle};
use synth::{ResultSynthesizer, Synthesis};

/// How a single query ended. `Display` gives the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// No subject term could be read from the query.
    Unparseable,
    /// No section mentions any subject.
    NoCandidates { subjects: String },
    /// Candidate sections existed but none yielded a span.
    NotFound { subjects: String },
    Answer(String),
    /// Unexpected fault; details are in the log.
    Failed,
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparseable => write!(f, "無法從您的訊息中解析出有效的原料名稱進行查詢。"),
            Self::NoCandidates { subjects } => {
                write!(f, "在SOP文件中，找不到與原料【{}】直接相關的工作表。", subjects)
            }
            Self::NotFound { subjects } => write!(
                f,
                "已檢查所有相關SOP文件區塊，但均未找到關於原料【{}】的直接操作說明或注意事項。",
                subjects
            ),
            Self::Answer(text) if text.trim().is_empty() => write!(f, "抱歉，未能找到明確的資訊。"),
            Self::Answer(text) => write!(f, "{}", text),
            Self::Failed => write!(f, "處理查詢時遇到未預期的錯誤，請檢查日誌。"),
        }
    }
}

/// Query pipeline over a fixed set of sections. Holding a `QueryEngine`
/// means initialization succeeded; all state is read-only afterwards.
pub struct QueryEngine {
    store: SectionStore,
    keywords: KeywordExtractor,
    extractor: SpanExtractor,
    synthesizer: ResultSynthesizer,
}

impl QueryEngine {
    pub fn new(
        store: SectionStore,
        keywords: KeywordExtractor,
        extraction: Arc<dyn ExtractionOracle>,
        synthesis: Arc<dyn SynthesisOracle>,
    ) -> Self {
        Self {
            store,
            keywords,
            extractor: SpanExtractor::new(extraction),
            synthesizer: ResultSynthesizer::new(synthesis),
        }
    }

    /// Build the LLM-backed engine. Fails on missing credentials or an
    /// unusable document.
    pub fn from_config(config: &AppConfig) -> Result<Self, InitError> {
        let llm = Arc::new(LlmClient::new(&config.llm)?);
        info!(model = llm.model(), "LLM client initialized");

        let store = SectionStore::open(
            &config.document.path,
            &config.document.section_marker,
            &config.document.allowed_titles,
        )?;
        let keywords = KeywordExtractor::new(&config.vocabulary);
        let oracle = Arc::new(LlmOracle::new(llm));

        Ok(Self::new(store, keywords, oracle.clone(), oracle))
    }

    pub fn store(&self) -> &SectionStore {
        &self.store
    }

    /// Answer a query. Never fails and never panics; faults become a
    /// generic message after being logged.
    pub async fn process_query(&self, query: &str) -> String {
        self.run(query).await.to_string()
    }

    pub async fn run(&self, query: &str) -> QueryOutcome {
        let started = Instant::now();
        info!(query, "Processing query");

        let outcome = match AssertUnwindSafe(self.try_run(query)).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(query, error = ?e, "Query failed");
                QueryOutcome::Failed
            }
            Err(panic) => {
                error!(query, panic = %panic_message(&*panic), "Query panicked");
                QueryOutcome::Failed
            }
        };

        info!(
            query,
            elapsed_ms = started.elapsed().as_millis() as u64,
            outcome = outcome_kind(&outcome),
            "Query complete"
        );
        outcome
    }

    async fn try_run(&self, query: &str) -> Result<QueryOutcome> {
        let Some(parsed) = self.keywords.parse(query) else {
            return Ok(QueryOutcome::Unparseable);
        };
        let subjects = parsed.subjects_joined();

        let candidates = select::select(self.store.sections(), &parsed);
        if candidates.is_empty() {
            return Ok(QueryOutcome::NoCandidates { subjects });
        }
        info!(candidates = candidates.len(), subjects = %subjects, "Extracting from candidate sections");

        let results = self.extractor.extract_all(&candidates, &parsed).await;
        let hits: Vec<&str> = results
            .iter()
            .filter(|r| r.found)
            .map(|r| r.section_title.as_str())
            .collect();
        info!(found = hits.len(), total = results.len(), sections = ?hits, "Extraction complete");

        Ok(match self.synthesizer.synthesize(&parsed, &results).await? {
            Synthesis::NotFound => QueryOutcome::NotFound { subjects },
            Synthesis::Answer(text) => QueryOutcome::Answer(text),
        })
    }
}

fn outcome_kind(outcome: &QueryOutcome) -> &'static str {
    match outcome {
        QueryOutcome::Unparseable => "unparseable",
        QueryOutcome::NoCandidates { .. } => "no_candidates",
        QueryOutcome::NotFound { .. } => "not_found",
        QueryOutcome::Answer(_) => "answer",
        QueryOutcome::Failed => "failed",
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
