/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the model backend directly.
/// All LLM interactions MUST go through this module.
///
/// The backend is any OpenAI-compatible chat-completions endpoint; the
/// default deployment points at a local Ollama instance. Model id,
/// temperature, and timeout come from [`Config`](crate::config::Config).
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::extract::{extract, Extracted};

#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure, timeout, or backend-side error. 503-equivalent.
    #[error("LLM unavailable: {0}")]
    Unavailable(String),

    /// The model replied with no content at all.
    #[error("LLM returned empty content")]
    EmptyContent,

    /// The model replied, but no structured output survived extraction.
    /// 502-equivalent; raised only by callers that require non-empty data.
    #[error("LLM returned invalid JSON")]
    InvalidJson,
}

/// The chat seam every pipeline stage and endpoint talks through.
///
/// Stages take `&dyn ChatApi` so tests can script responses without a live
/// backend. There is deliberately no internal retry: each call is a single
/// request/response exchange and retry policy belongs to the caller.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Sends one system/user prompt pair and returns the raw reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;

    /// Composes `complete` with JSON recovery. `Empty` is data, not an
    /// error: most pipeline stages tolerate it and degrade.
    async fn complete_extracted(&self, system: &str, user: &str) -> Result<Extracted, LlmError> {
        let raw = self.complete(system, user).await?;
        Ok(extract(&raw))
    }

    /// Like `complete_extracted`, but for callers that cannot tolerate empty
    /// output. Fails with `InvalidJson` when every recovery strategy came up
    /// dry.
    async fn complete_json_required(
        &self,
        system: &str,
        user: &str,
    ) -> Result<serde_json::Value, LlmError> {
        match self.complete_extracted(system, user).await? {
            Extracted::Empty => Err(LlmError::InvalidJson),
            other => Ok(other.into_value()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP client
// ────────────────────────────────────────────────────────────────────────────

/// The production `ChatApi` backed by an OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: f64,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.llm_timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lists model ids available on the backend. Used by `/models` and the
    /// health probes.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Unavailable(format!(
                "model listing returned {status}: {body}"
            )));
        }

        let listing: ModelListing = response
            .json()
            .await
            .map_err(|e| LlmError::Unavailable(format!("unreadable model listing: {e}")))?;

        Ok(listing.data.into_iter().map(|m| m.id).collect())
    }
}

#[async_trait]
impl ChatApi for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Unavailable(format!(
                "chat completion returned {status}: {body}"
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Unavailable(format!("unreadable completion body: {e}")))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!("LLM call succeeded: {} chars of content", content.len());
        Ok(content)
    }
}

/// Maps reqwest failures onto the unavailable bucket, keeping the timeout /
/// connect distinction in the message.
fn transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Unavailable(format!("request timed out: {e}"))
    } else if e.is_connect() {
        LlmError::Unavailable(format!("connection failed: {e}"))
    } else {
        LlmError::Unavailable(format!("request failed: {e}"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (OpenAI-compatible)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelListing {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}
