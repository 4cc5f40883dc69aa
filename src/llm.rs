use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::InitError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self, InitError> {
        config.validate()?;
        let api_key = config.api_key.clone().unwrap_or_default();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Resolve the chat completions endpoint from the base URL.
    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            base.to_string()
        } else if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    /// Non-streaming chat completion. `temperature = None` leaves the server default.
    pub async fn chat(&self, messages: &[Message], temperature: Option<f32>) -> Result<String> {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(t) = temperature {
            body["temperature"] = serde_json::json!(t);
        }

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("LLM request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("Failed to read LLM response")?;
        reply_content(status, &text)
    }
}

/// Assistant text from a chat-completions response body.
fn reply_content(status: StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        anyhow::bail!("LLM returned {}: {}", status, preview(body, 500));
    }

    let json: serde_json::Value = serde_json::from_str(body).context("Failed to parse LLM JSON")?;

    // choices[0].message.content may be null
    Ok(json["choices"]
        .get(0)
        .and_then(|c| c["message"]["content"].as_str())
        .unwrap_or("")
        .to_string())
}

/// Single-turn text completion, the only capability the pipeline and the
/// evaluation harness need from a model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str, temperature: Option<f32>) -> Result<String>;
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, prompt: &str, temperature: Option<f32>) -> Result<String> {
        self.chat(&[Message::user(prompt)], temperature).await
    }
}

/// Single-turn prompt whose reply must be a JSON document of type `T`.
pub async fn complete_json<T: DeserializeOwned>(
    model: &dyn ChatModel,
    prompt: &str,
    temperature: Option<f32>,
) -> Result<T> {
    let raw = model.complete(prompt, temperature).await?;
    parse_json_reply(&raw)
}

/// Models often wrap JSON in a ```json fence; accept both forms.
pub fn parse_json_reply<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body)
        .with_context(|| format!("LLM reply is not the expected JSON: {}", preview(body, 200)))
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string ("json") on the opening line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().trim_end_matches("```").trim()
}

/// First `max` chars of `s`, for log lines.
pub fn preview(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
