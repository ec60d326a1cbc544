//! Error taxonomy for the agent core
//!
//! Every fallible operation in the ledger, suggestion queue, gateway, and
//! strategies returns one of these variants. Strategy execution records the
//! error on the ledger entry before propagating it, so a failed task is
//! always inspectable after the fact.

use crate::models::TaskStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Malformed or missing input, rejected before any gateway call
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport, auth, or rate-limit failure from the LLM provider
    #[error("provider error: {0}")]
    Provider(String),

    /// Gateway call exceeded the configured per-call timeout
    #[error("gateway call timed out after {0}s")]
    Timeout(u64),

    /// Task ledger state-machine violation
    #[error("invalid task transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// Suggestion was already accepted or rejected
    #[error("suggestion {0} is already resolved")]
    AlreadyResolved(i64),

    #[error("{0} not found")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
