use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::error::InitError;

const DEFAULT_SECTION_MARKER: &str = "## 工作表:";
const DEFAULT_ALLOWED_TITLES: &[&str] = &["工作表: 9", "工作表: 10"];
const DEFAULT_DESCRIPTORS: &[&str] = &["結塊", "過篩", "順序", "吸濕", "稠度", "黏稠", "流動性"];
const DEFAULT_STOP_WORDS: &[&str] = &[
    "的", "和", "與", "或", "了", "呢", "嗎", "喔", "啊", "關於", "有關", "請", "請問",
];

/// Connection settings for the chat-completions backend.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Both oracles need a key and a model before the engine can start.
    pub fn validate(&self) -> Result<(), InitError> {
        if self.model.trim().is_empty() {
            return Err(InitError::MissingModel);
        }
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(InitError::MissingCredentials),
        }
    }
}

/// Token classes used by the keyword extractor.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    pub stop_words: HashSet<String>,
    pub descriptors: Vec<String>,
}

impl Vocabulary {
    pub fn new<S, D>(stop_words: S, descriptors: D) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            stop_words: stop_words.into_iter().map(Into::into).collect(),
            descriptors: descriptors.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub path: PathBuf,
    pub section_marker: String,
    pub allowed_titles: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub document: DocumentConfig,
    pub vocabulary: Vocabulary,
}

impl AppConfig {
    /// Read settings from the process environment (and `.env`, once loaded).
    /// Missing credentials are not an error here; the engine rejects them.
    pub fn from_env() -> Result<Self> {
        let base_url = dotenv::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = var_any(&["LLM_MODEL", "MODEL_NAME"])
            .unwrap_or_else(|| "gpt-4o-mini".to_string());
        let api_key = var_any(&["LLM_API_KEY", "OPENAI_API_KEY"]).filter(|k| !k.is_empty());
        let timeout_secs = match dotenv::var("LLM_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("LLM_TIMEOUT_SECS is not a number: {}", raw))?,
            Err(_) => 120,
        };

        let path = var_any(&["SOP_DOCUMENT", "SIMPLIFIED_MD_FILENAME"])
            .unwrap_or_else(|| "simplified_output_by_section.md".to_string());
        let section_marker = dotenv::var("SOP_SECTION_MARKER")
            .unwrap_or_else(|_| DEFAULT_SECTION_MARKER.to_string());

        Ok(Self {
            llm: LlmConfig {
                base_url,
                model,
                api_key,
                timeout_secs,
            },
            document: DocumentConfig {
                path: PathBuf::from(path),
                section_marker,
                allowed_titles: list_var("SOP_ALLOWED_TITLES", DEFAULT_ALLOWED_TITLES),
            },
            vocabulary: Vocabulary::new(
                list_var("SOP_STOP_WORDS", DEFAULT_STOP_WORDS),
                list_var("SOP_DESCRIPTORS", DEFAULT_DESCRIPTORS),
            ),
        })
    }
}

/// First non-empty value among several accepted variable names.
fn var_any(keys: &[&str]) -> Option<String> {
    first_set(keys, |k| dotenv::var(k).ok())
}

fn first_set(keys: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    keys.iter()
        .filter_map(|k| lookup(k))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Comma-separated list, falling back to the built-in defaults.
fn list_var(key: &str, defaults: &[&str]) -> Vec<String> {
    match dotenv::var(key) {
        Ok(raw) if !raw.trim().is_empty() => split_list(&raw),
        _ => defaults.iter().map(|s| s.to_string()).collect(),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
