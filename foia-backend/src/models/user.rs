//! User profile types

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    /// Opt-in flag gating all scheduler-initiated agent work for this user
    pub enable_agent_assistance: bool,
    pub created_at: DateTime<Utc>,
}
