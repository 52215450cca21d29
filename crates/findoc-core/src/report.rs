//! Final-output contract validation and analysis record persistence.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AnalyzerError;

/// Keys the final pipeline output must contain.
pub const REQUIRED_KEYS: [&str; 5] = [
    "revenue_analysis",
    "profitability_analysis",
    "cash_flow_analysis",
    "risk_assessment",
    "investment_insight",
];

/// Compliance policy: every response carries this fixed insight wording,
/// whatever the advisor produced.
pub const INVESTMENT_INSIGHT_POLICY: &str = "balanced and non-speculative";

/// The five-field analysis returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub revenue_analysis: String,
    pub profitability_analysis: String,
    pub cash_flow_analysis: String,
    pub risk_assessment: String,
    pub investment_insight: String,
}

/// Parse the pipeline's final text against the five-key contract.
///
/// Values are coerced to text (JSON strings verbatim, anything else via its
/// JSON rendering), extra keys are dropped, and `investment_insight` is
/// always replaced with [`INVESTMENT_INSIGHT_POLICY`].
pub fn validate_analysis(raw: &str) -> Result<AnalysisResult, AnalyzerError> {
    let parsed: Value = serde_json::from_str(raw.trim())
        .map_err(|err| AnalyzerError::MalformedOutput(format!("not valid JSON: {err}")))?;

    let object = parsed.as_object().ok_or_else(|| {
        AnalyzerError::MalformedOutput("expected a top-level JSON object".to_string())
    })?;

    let mut missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .filter(|key| !object.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(AnalyzerError::MissingKeys(missing));
    }

    Ok(AnalysisResult {
        revenue_analysis: coerce_text(&object["revenue_analysis"]),
        profitability_analysis: coerce_text(&object["profitability_analysis"]),
        cash_flow_analysis: coerce_text(&object["cash_flow_analysis"]),
        risk_assessment: coerce_text(&object["risk_assessment"]),
        investment_insight: INVESTMENT_INSIGHT_POLICY.to_string(),
    })
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// One persisted analysis outcome; written once, never read back.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub file_name: String,
    pub file_path: String,
    pub query: String,
    pub analysis: AnalysisResult,
    pub generated_at_utc: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        query: impl Into<String>,
        analysis: AnalysisResult,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_path: file_path.into(),
            query: query.into(),
            analysis,
            generated_at_utc: Utc::now(),
        }
    }
}

/// Write one record to `<dir>/analysis_{file_id}.json`.
pub fn persist_record(dir: &Path, file_id: &str, record: &AnalysisRecord) -> Result<PathBuf> {
    create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(format!("analysis_{file_id}.json"));
    let payload = serde_json::to_vec_pretty(record)?;
    let mut file = File::create(&path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    file.write_all(&payload)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(path)
}
