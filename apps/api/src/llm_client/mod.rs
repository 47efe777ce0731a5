/// LLM Client: the single point of entry for all text generation calls.
///
/// ARCHITECTURAL RULE: No other module may call the generation service directly.
/// Session code talks to the `TextGenerator` trait; `LlmClient` is the only
/// implementation that touches the network.
///
/// The service speaks the OpenAI-compatible chat-completions protocol:
/// role-tagged messages in, `choices[0].message.content` out.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Generation service returned no content")]
    NoContent,
}

/// Per-call sampling settings. Fixed per prompt kind, never taken from users.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Connection settings, built from `Config` and injected at construction.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    /// Total attempts per call. 1 disables retries.
    pub max_attempts: u32,
}

/// Anything that turns a prompt into generated text.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>` so tests can swap in a fake.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        params: GenerationParams,
    ) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Pulls `choices[0].message.content` out of a chat-completions body.
/// Blank content counts as no content.
pub fn completion_text(body: &Value) -> Option<&str> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

/// Best-effort message from an error body: `{"error": {"message": ...}}` or the raw text.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(String::from)
        })
        .unwrap_or(body)
}

/// The generation client used by all session modes.
/// Wraps the chat-completions API with a bounded timeout and optional retry.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn classify(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.config.timeout)
        } else {
            GenerationError::Http(err)
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    /// Makes one logical call to the generation service.
    /// Retries on 429, 5xx and transport errors with exponential backoff when
    /// `max_attempts > 1`; other failures return immediately.
    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        params: GenerationParams,
    ) -> Result<String, GenerationError> {
        let request_body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let attempts = self.config.max_attempts.max(1);
        let mut last_error: Option<GenerationError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s, 2s, ...
                let delay = Duration::from_millis(500 * (1 << (attempt - 1).min(6)));
                warn!(
                    "Generation attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.config.api_url)
                .bearer_auth(&self.config.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(self.classify(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Generation API returned {}", status);
                last_error = Some(GenerationError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GenerationError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
            }

            let raw = response.text().await.map_err(|e| self.classify(e))?;
            let body: Value = serde_json::from_str(&raw)?;

            let prompt_tokens = body.pointer("/usage/prompt_tokens").and_then(Value::as_u64);
            let completion_tokens = body
                .pointer("/usage/completion_tokens")
                .and_then(Value::as_u64);
            debug!(
                "Generation call succeeded: prompt_chars={}, prompt_tokens={:?}, completion_tokens={:?}",
                prompt.len(),
                prompt_tokens,
                completion_tokens,
            );

            return completion_text(&body)
                .map(String::from)
                .ok_or(GenerationError::NoContent);
        }

        Err(last_error.unwrap_or(GenerationError::NoContent))
    }
}
