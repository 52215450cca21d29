use std::path::PathBuf;

use thiserror::Error;

/// Core error type for the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("missing environment variable: {0}")]
    MissingSecret(String),
    #[error("configuration error: {0}")]
    InvalidConfiguration(String),
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("generation backend error: {0}")]
    Backend(String),
    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: Box<AnalyzerError>,
    },
    #[error("malformed analysis output: {0}")]
    MalformedOutput(String),
    #[error("analysis output is missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),
}

impl AnalyzerError {
    /// True when the final pipeline output violated the five-key contract,
    /// as opposed to the pipeline itself failing.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            AnalyzerError::MalformedOutput(_) | AnalyzerError::MissingKeys(_)
        )
    }
}
