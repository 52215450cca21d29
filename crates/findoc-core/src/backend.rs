//! Shared text-generation backend behind the agent roster.
//!
//! The production implementation talks to an OpenAI-compatible
//! `chat/completions` endpoint; tests substitute scripted implementations
//! through the [`GenerationBackend`] trait object.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::AnalyzerError;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Opaque capability: given role framing and a prompt, return free text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, AnalyzerError>;
}

/// Backend for OpenAI-compatible chat completion APIs.
pub struct OpenAiBackend {
    client: Client,
    config: LlmConfig,
}

impl OpenAiBackend {
    pub fn new(config: LlmConfig) -> Result<Self, AnalyzerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| AnalyzerError::Backend(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { client, config })
    }

    /// Build a backend from `OPENAI_*` environment variables; fails without
    /// a configured credential.
    pub fn from_env() -> Result<Self, AnalyzerError> {
        Self::new(LlmConfig::from_env()?)
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, AnalyzerError> {
        let request = ChatRequest {
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
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|err| AnalyzerError::Backend(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => AnalyzerError::Backend(
                    "authentication failed; check OPENAI_API_KEY".to_string(),
                ),
                429 => AnalyzerError::Backend(format!("rate limited: {body}")),
                _ => AnalyzerError::Backend(format!("HTTP {status}: {body}")),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| AnalyzerError::Backend(format!("unexpected response shape: {err}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AnalyzerError::Backend("response contained no completion".to_string()))?;

        debug!(model = %self.config.model, chars = content.len(), "completion received");
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
