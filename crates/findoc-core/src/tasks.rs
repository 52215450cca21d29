//! The fixed task chain executed for every analysis request.
//!
//! Tasks are declarative value structs. The chain here is strictly linear,
//! but each task carries its predecessor list explicitly so branches can be
//! introduced later without touching the executor.

use crate::agents::AgentKind;

pub type TaskId = &'static str;

pub const VERIFICATION: TaskId = "verification";
pub const FINANCIAL_ANALYSIS: TaskId = "financial_analysis";
pub const RISK_ASSESSMENT: TaskId = "risk_assessment";
pub const INVESTMENT_INSIGHT: TaskId = "investment_insight";

/// One step of the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub id: TaskId,
    pub agent: AgentKind,
    /// Instruction template; `{file_path}` and `{query}` are substituted at
    /// run time.
    pub instructions: &'static str,
    pub expected_output: &'static str,
    /// Predecessor tasks whose outputs become this task's context.
    pub depends_on: &'static [TaskId],
}

/// The four tasks in execution order (already topologically sorted).
pub const ANALYSIS_TASKS: [TaskSpec; 4] = [
    TaskSpec {
        id: VERIFICATION,
        agent: AgentKind::Verifier,
        instructions: "Read the uploaded PDF at {file_path}. Confirm it is a financial \
                       document and extract concise factual evidence relevant to revenue, \
                       profitability, cash flow, and risk, keeping the user's request in \
                       mind: {query}. Use only statements explicitly present in the \
                       document text. Do not use external knowledge, web search, \
                       assumptions, or invented data.",
        expected_output: "A concise evidence report with: (1) document validation status, \
                          (2) key factual excerpts, (3) page references if available, and \
                          (4) any data limitations found in the document.",
        depends_on: &[],
    },
    TaskSpec {
        id: FINANCIAL_ANALYSIS,
        agent: AgentKind::Analyst,
        instructions: "Using the verified evidence from the prior step, produce three \
                       sections: revenue analysis, profitability analysis, and cash flow \
                       analysis. Every claim must be directly supported by the uploaded \
                       document at {file_path}. If data is missing, explicitly state that \
                       it is not present.",
        expected_output: "A structured analysis with exactly these sections: \
                          revenue_analysis, profitability_analysis, cash_flow_analysis. \
                          No speculation and no external references.",
        depends_on: &[VERIFICATION],
    },
    TaskSpec {
        id: RISK_ASSESSMENT,
        agent: AgentKind::RiskAssessor,
        instructions: "Based on the verified evidence and financial analysis, produce a \
                       conservative risk assessment using only facts present in the \
                       uploaded PDF at {file_path}. Do not infer risks without textual \
                       support.",
        expected_output: "A single section named risk_assessment with evidence-based risk \
                          observations and explicit limitations.",
        depends_on: &[VERIFICATION, FINANCIAL_ANALYSIS],
    },
    TaskSpec {
        id: INVESTMENT_INSIGHT,
        agent: AgentKind::Advisor,
        instructions: "Produce the final result as strict JSON with keys: \
                       revenue_analysis, profitability_analysis, cash_flow_analysis, \
                       risk_assessment, investment_insight. The investment_insight value \
                       must be balanced and non-speculative. Use only prior step outputs \
                       grounded in {file_path}. Do not add markdown, code fences, or \
                       extra keys.",
        expected_output: "{\"revenue_analysis\":\"...\",\"profitability_analysis\":\"...\",\
                          \"cash_flow_analysis\":\"...\",\"risk_assessment\":\"...\",\
                          \"investment_insight\":\"balanced and non-speculative\"}",
        depends_on: &[VERIFICATION, FINANCIAL_ANALYSIS, RISK_ASSESSMENT],
    },
];
