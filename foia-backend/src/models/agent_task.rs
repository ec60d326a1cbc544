//! Agent task ledger types
//!
//! Every LLM invocation is recorded as an AgentTask so the call has an audit
//! trail: what was asked, what came back, how many tokens it cost, and how it
//! ended. Rows are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Capability performed by an agent invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Draft,
    Analyze,
    FollowUp,
    Summarize,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Draft => write!(f, "draft"),
            TaskKind::Analyze => write!(f, "analyze"),
            TaskKind::FollowUp => write!(f, "follow_up"),
            TaskKind::Summarize => write!(f, "summarize"),
        }
    }
}

impl TaskKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(TaskKind::Draft),
            "analyze" => Some(TaskKind::Analyze),
            "follow_up" | "followup" => Some(TaskKind::FollowUp),
            "summarize" => Some(TaskKind::Summarize),
            _ => None,
        }
    }

    /// Human-readable label for UI display
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Draft => "Request draft",
            TaskKind::Analyze => "Response analysis",
            TaskKind::FollowUp => "Follow-up",
            TaskKind::Summarize => "Document summary",
        }
    }
}

/// Lifecycle state of an agent task
///
/// Transitions are pending -> processing -> {completed, failed}; completed
/// and failed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

impl TaskStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(TaskStatus::Pending),
            "processing" => Some(TaskStatus::Processing),
            "completed" => Some(TaskStatus::Completed),
            "failed" => Some(TaskStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// One agent invocation recorded in the ledger
#[derive(Debug, Clone, Serialize)]
pub struct AgentTask {
    pub id: i64,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub user_id: i64,
    /// Subject request this invocation concerns, if any
    pub request_id: Option<i64>,
    /// Structured input the strategy was invoked with
    pub input: Value,
    /// Structured output, present once the task completes
    pub output: Option<Value>,
    /// Error message, present once the task fails
    pub error: Option<String>,
    /// Model identifier the invocation was sent to
    pub model: String,
    pub tokens_used: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            TaskKind::Draft,
            TaskKind::Analyze,
            TaskKind::FollowUp,
            TaskKind::Summarize,
        ] {
            assert_eq!(TaskKind::from_str(&kind.to_string()), Some(kind));
        }
        assert_eq!(TaskKind::from_str("unknown"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }
}
