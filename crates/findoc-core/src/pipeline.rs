//! Sequential executor for the analysis task chain.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use crate::agents::AgentRoster;
use crate::backend::GenerationBackend;
use crate::error::AnalyzerError;
use crate::report::{AnalysisResult, validate_analysis};
use crate::tasks::{ANALYSIS_TASKS, TaskSpec};

/// Query used when the caller supplies none (or only whitespace).
pub const DEFAULT_QUERY: &str = "Analyze this financial document using only document evidence.";

/// Inputs shared by every task in one run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub query: String,
    pub file_path: PathBuf,
}

impl AnalysisRequest {
    pub fn new(query: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            query: query.into(),
            file_path: file_path.into(),
        }
    }
}

/// Runs the fixed agent pipeline over one document at a time.
pub struct Analyzer {
    roster: AgentRoster,
}

impl Analyzer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            roster: AgentRoster::new(backend),
        }
    }

    /// Run the full chain and validate the final output against the
    /// five-key contract.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalyzerError> {
        let raw = self.execute(&ANALYSIS_TASKS, request).await?;
        validate_analysis(&raw)
    }

    /// Execute tasks strictly in order and return the last task's raw text
    /// unmodified.
    ///
    /// Each task sees only the outputs of its declared predecessors, not the
    /// full transcript. The tasks run sequentially because later
    /// instructions depend on earlier outputs; this is a correctness
    /// requirement, not an implementation default. Any task failure aborts
    /// the run with no retry and no partial result.
    #[instrument(skip_all, fields(file = %request.file_path.display()))]
    pub async fn execute(
        &self,
        tasks: &[TaskSpec],
        request: &AnalysisRequest,
    ) -> Result<String, AnalyzerError> {
        let mut outputs: HashMap<&str, String> = HashMap::new();

        for task in tasks {
            let started = Instant::now();
            info!(task_id = task.id, agent = task.agent.as_str(), "running task");

            let instructions = render_instructions(task, request);
            let context: Vec<String> = task
                .depends_on
                .iter()
                .filter_map(|dep| outputs.get(dep).cloned())
                .collect();

            let agent = self.roster.get(task.agent);
            let output = agent
                .run(&instructions, &request.file_path, &context)
                .await
                .map_err(|err| AnalyzerError::TaskFailed {
                    task: task.id.to_string(),
                    source: Box::new(err),
                })?;

            info!(
                task_id = task.id,
                duration_ms = started.elapsed().as_millis() as u64,
                output_chars = output.len(),
                "task complete"
            );

            outputs.insert(task.id, output);
        }

        let last = tasks.last().ok_or_else(|| {
            AnalyzerError::InvalidConfiguration("task list is empty".to_string())
        })?;
        outputs.remove(last.id).ok_or_else(|| {
            AnalyzerError::InvalidConfiguration(format!("no output recorded for '{}'", last.id))
        })
    }
}

fn render_instructions(task: &TaskSpec, request: &AnalysisRequest) -> String {
    let rendered = task
        .instructions
        .replace("{file_path}", &request.file_path.display().to_string())
        .replace("{query}", &request.query);
    format!(
        "{rendered}\n\nExpected output: {expected}",
        expected = task.expected_output
    )
}
