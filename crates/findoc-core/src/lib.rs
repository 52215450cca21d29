//! Core pipeline for evidence-grounded financial document analysis.
//!
//! This crate wires four role-scoped agents (document verifier, financial
//! analyst, risk assessor, investment advisor) into a fixed sequential task
//! chain over a shared text-generation backend, validates the final output
//! against a strict five-key JSON contract, and persists analysis records.

mod agents;
mod backend;
mod config;
mod document;
mod error;
mod pipeline;
mod report;
mod tasks;

pub use agents::{Agent, AgentKind, AgentProfile, AgentRoster};
pub use backend::{GenerationBackend, OpenAiBackend};
pub use config::{DEFAULT_API_BASE, DEFAULT_MODEL, GENERATION_TEMPERATURE, LlmConfig};
pub use document::DocumentReader;
pub use error::AnalyzerError;
pub use pipeline::{AnalysisRequest, Analyzer, DEFAULT_QUERY};
pub use report::{
    AnalysisRecord, AnalysisResult, INVESTMENT_INSIGHT_POLICY, REQUIRED_KEYS, persist_record,
    validate_analysis,
};
pub use tasks::{ANALYSIS_TASKS, TaskId, TaskSpec};
