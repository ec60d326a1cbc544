//! FOIA request domain types
//!
//! The request store is a collaborator of the agent core: the scheduler
//! sweeps read it with two filter predicates and write analysis fields back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow state of a FOIA request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Draft,
    Submitted,
    Completed,
    Withdrawn,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Draft => write!(f, "draft"),
            RequestStatus::Submitted => write!(f, "submitted"),
            RequestStatus::Completed => write!(f, "completed"),
            RequestStatus::Withdrawn => write!(f, "withdrawn"),
        }
    }
}

impl RequestStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(RequestStatus::Draft),
            "submitted" => Some(RequestStatus::Submitted),
            "completed" => Some(RequestStatus::Completed),
            "withdrawn" => Some(RequestStatus::Withdrawn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FoiaRequest {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub request_body: String,
    pub agency_name: String,
    pub agency_type: String,
    pub status: RequestStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub tracking_number: Option<String>,
    pub response_received: bool,
    /// Agent-written analysis of the agency response; empty until analyzed
    pub response_summary: String,
    pub requires_followup: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a request
#[derive(Debug, Clone, Deserialize)]
pub struct NewFoiaRequest {
    pub user_id: i64,
    pub title: String,
    pub request_body: String,
    pub agency_name: String,
    pub agency_type: String,
}

/// Direction of a communication on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Incoming => write!(f, "incoming"),
            Direction::Outgoing => write!(f, "outgoing"),
        }
    }
}

impl Direction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "incoming" => Some(Direction::Incoming),
            "outgoing" => Some(Direction::Outgoing),
            _ => None,
        }
    }
}

/// One message exchanged with an agency about a request
#[derive(Debug, Clone, Serialize)]
pub struct Communication {
    pub id: i64,
    pub request_id: i64,
    pub direction: Direction,
    pub subject: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
