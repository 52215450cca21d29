use std::env;

use crate::error::AnalyzerError;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Temperature is pinned so repeated runs over the same document stay close.
pub const GENERATION_TEMPERATURE: f32 = 0.0;

/// Connection settings for the shared generation backend.
///
/// Constructed once at startup and injected into every agent; construction
/// fails when no credential is configured.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: String,
    pub api_base: String,
    pub temperature: f32,
}

impl LlmConfig {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            temperature: GENERATION_TEMPERATURE,
        }
    }

    /// Resolve configuration from the process environment.
    ///
    /// `OPENAI_API_KEY` is required; `OPENAI_MODEL` and `OPENAI_API_BASE`
    /// fall back to defaults when unset or blank.
    pub fn from_env() -> Result<Self, AnalyzerError> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AnalyzerError::MissingSecret("OPENAI_API_KEY".to_string()))?;

        let model = env::var("OPENAI_MODEL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_base = env::var("OPENAI_API_BASE")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            model,
            api_key,
            api_base,
            temperature: GENERATION_TEMPERATURE,
        })
    }
}
