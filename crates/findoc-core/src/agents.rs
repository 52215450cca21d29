//! The four fixed personas that make up the analysis roster.
//!
//! Each agent is a role-scoped wrapper around the shared generation backend.
//! Document access is an explicit capability: agents holding a
//! [`DocumentReader`] ground their prompt in the extracted document text,
//! agents without it see only the outputs of earlier tasks.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::backend::GenerationBackend;
use crate::document::DocumentReader;
use crate::error::AnalyzerError;

/// Roster slot an agent occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Verifier,
    Analyst,
    RiskAssessor,
    Advisor,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Verifier => "verifier",
            AgentKind::Analyst => "analyst",
            AgentKind::RiskAssessor => "risk_assessor",
            AgentKind::Advisor => "advisor",
        }
    }
}

/// Immutable persona for one agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentProfile {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

/// A persona bound to the shared backend, with optional document access.
pub struct Agent {
    profile: AgentProfile,
    backend: Arc<dyn GenerationBackend>,
    reader: Option<DocumentReader>,
}

impl Agent {
    pub fn new(
        profile: AgentProfile,
        backend: Arc<dyn GenerationBackend>,
        reader: Option<DocumentReader>,
    ) -> Self {
        Self {
            profile,
            backend,
            reader,
        }
    }

    pub fn role(&self) -> &'static str {
        self.profile.role
    }

    pub fn has_document_access(&self) -> bool {
        self.reader.is_some()
    }

    /// Invoke the backend once for this persona.
    ///
    /// Stateless: no retry, no memory, no delegation. The persona becomes
    /// the system framing; the prompt is the rendered instructions plus, in
    /// order, the extracted document text (tool holders only) and the
    /// predecessor outputs.
    pub async fn run(
        &self,
        instructions: &str,
        document_path: &Path,
        context: &[String],
    ) -> Result<String, AnalyzerError> {
        let system = format!(
            "You are {role}.\nGoal: {goal}\nBackground: {backstory}",
            role = self.profile.role,
            goal = self.profile.goal,
            backstory = self.profile.backstory,
        );

        let mut prompt = instructions.to_string();

        if let Some(reader) = &self.reader {
            let document = reader.read(document_path)?;
            prompt.push_str("\n\nDocument text:\n");
            prompt.push_str(&document);
        }

        for text in context {
            prompt.push_str("\n\nContext from a prior step:\n");
            prompt.push_str(text);
        }

        debug!(
            role = self.profile.role,
            document_access = self.reader.is_some(),
            prompt_chars = prompt.len(),
            "invoking generation backend"
        );

        self.backend.generate(&system, &prompt).await
    }
}

/// The four agents, constructed once and shared across requests.
pub struct AgentRoster {
    pub verifier: Agent,
    pub analyst: Agent,
    pub risk_assessor: Agent,
    pub advisor: Agent,
}

impl AgentRoster {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        let verifier = Agent::new(
            AgentProfile {
                role: "Financial Document Verifier",
                goal: "Validate that the uploaded file is a readable financial PDF and \
                       extract only explicit factual evidence from its text.",
                backstory: "A compliance-first document verification specialist who never \
                            infers missing facts and never consults external sources.",
            },
            backend.clone(),
            Some(DocumentReader),
        );

        let analyst = Agent::new(
            AgentProfile {
                role: "Senior Financial Analyst",
                goal: "Analyze revenue, profitability, and cash flow using only evidence \
                       extracted from the uploaded financial document.",
                backstory: "A rigorous financial analyst focused on verifiable statements \
                            from primary documents.",
            },
            backend.clone(),
            Some(DocumentReader),
        );

        let risk_assessor = Agent::new(
            AgentProfile {
                role: "Financial Risk Assessor",
                goal: "Identify business and financial risks strictly supported by \
                       statements in the uploaded PDF.",
                backstory: "Performs conservative, evidence-based risk assessment without \
                            speculation.",
            },
            backend.clone(),
            Some(DocumentReader),
        );

        // The advisor deliberately has no document access: it must rely on
        // the evidence chain established by the earlier tasks.
        let advisor = Agent::new(
            AgentProfile {
                role: "Investment Insight Advisor",
                goal: "Provide a balanced, non-speculative investment insight based only \
                       on documented evidence and prior team analysis.",
                backstory: "Produces compliance-safe, non-promotional insights and avoids \
                            prescriptive trading calls.",
            },
            backend,
            None,
        );

        Self {
            verifier,
            analyst,
            risk_assessor,
            advisor,
        }
    }

    pub fn get(&self, kind: AgentKind) -> &Agent {
        match kind {
            AgentKind::Verifier => &self.verifier,
            AgentKind::Analyst => &self.analyst,
            AgentKind::RiskAssessor => &self.risk_assessor,
            AgentKind::Advisor => &self.advisor,
        }
    }
}
