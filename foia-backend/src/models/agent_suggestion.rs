//! Agent suggestion types
//!
//! A suggestion is an agent-produced recommendation waiting for a human
//! decision. Accept and reject are mutually exclusive and permanent.

use crate::models::TaskKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AgentSuggestion {
    pub id: i64,
    pub user_id: i64,
    pub request_id: i64,
    /// Ledger entry of the invocation that produced this suggestion
    pub task_id: Option<i64>,
    pub kind: TaskKind,
    pub title: String,
    pub description: String,
    pub suggested_text: String,
    pub is_accepted: bool,
    pub is_rejected: bool,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl AgentSuggestion {
    pub fn is_resolved(&self) -> bool {
        self.is_accepted || self.is_rejected
    }
}
