//! Agent strategy contract and typed capability payloads

use crate::ai::Completion;
use crate::error::AgentError;
use crate::models::TaskKind;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// System + user prompt pair, built deterministically from typed input
#[derive(Debug, Clone)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Typed input for one agent invocation, tagged by capability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentInput {
    Draft {
        description: String,
        agency_name: String,
        agency_type: String,
    },
    Analyze {
        response_text: String,
        original_request: String,
    },
    FollowUp {
        context: FollowUpContext,
        reason: String,
    },
    Summarize {
        document_content: String,
        document_type: String,
    },
}

impl AgentInput {
    pub fn kind(&self) -> TaskKind {
        match self {
            AgentInput::Draft { .. } => TaskKind::Draft,
            AgentInput::Analyze { .. } => TaskKind::Analyze,
            AgentInput::FollowUp { .. } => TaskKind::FollowUp,
            AgentInput::Summarize { .. } => TaskKind::Summarize,
        }
    }
}

/// Request context handed to the follow-up strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpContext {
    pub title: String,
    pub agency: String,
    pub days_elapsed: i64,
}

/// Typed output of a completed invocation
///
/// Serialized untagged so the ledger stores exactly the capability's output
/// object, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentOutput {
    Draft(DraftOutput),
    Analysis(AnalysisOutput),
    FollowUp(FollowUpOutput),
    Summary(SummaryOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftOutput {
    pub request_text: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub summary: String,
    pub compliance_level: ComplianceLevel,
    pub requires_followup: bool,
    pub recommended_action: RecommendedAction,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComplianceLevel {
    Full,
    Partial,
    None,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecommendedAction {
    Accept,
    FollowUp,
    Appeal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpOutput {
    pub followup_text: String,
    pub suggested_subject: String,
    pub urgency: Urgency,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    pub summary: String,
    pub key_points: Vec<String>,
    pub word_count: usize,
}

/// One capability's prompt construction and output shaping
///
/// The shared execution skeleton (ledger transitions, gateway call, error
/// recording) lives in the executor; implementations stay pure so they are
/// trivially testable.
pub trait AgentStrategy: Send + Sync {
    fn kind(&self) -> TaskKind;

    /// Reject malformed input before any gateway call
    fn validate(&self, input: &AgentInput) -> Result<(), AgentError>;

    /// Build the system and user prompts
    fn build_prompt(&self, input: &AgentInput) -> Result<PromptPair, AgentError>;

    /// Shape the raw completion into the capability's typed output
    fn shape_output(
        &self,
        input: &AgentInput,
        completion: &Completion,
    ) -> Result<AgentOutput, AgentError>;
}

/// Error for an input handed to a strategy of a different capability
pub(crate) fn input_mismatch(expected: TaskKind) -> AgentError {
    AgentError::Validation(format!("input is not a {expected} payload"))
}
