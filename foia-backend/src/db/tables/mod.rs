//! Database model modules - extends Database with domain-specific methods
//!
//! Each module adds `impl Database` blocks with methods for a specific table group.

mod agent_suggestions; // agent_suggestions (human-review queue)
mod agent_tasks; // agent_tasks (invocation ledger)
mod foia_requests; // foia_requests, communications
mod users; // users

use chrono::{DateTime, Utc};

/// Parse an RFC 3339 TEXT column written by this crate
pub(crate) fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

pub(crate) fn parse_opt_ts(s: Option<String>) -> Option<DateTime<Utc>> {
    s.map(|v| parse_ts(&v))
}
