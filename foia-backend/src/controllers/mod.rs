//! HTTP endpoints for the agent workflow
//!
//! Authentication is handled upstream of this service, so requests identify
//! their user explicitly. Every handler maps AgentError through the same
//! status table below.

pub mod agents;
pub mod health;
pub mod suggestions;
pub mod tasks;

use crate::error::AgentError;
use actix_web::HttpResponse;

/// Map an agent error to its HTTP response
pub(crate) fn error_response(e: &AgentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        AgentError::Validation(_) => HttpResponse::BadRequest().json(body),
        AgentError::NotFound(_) => HttpResponse::NotFound().json(body),
        AgentError::AlreadyResolved(_) | AgentError::InvalidTransition { .. } => {
            HttpResponse::Conflict().json(body)
        }
        AgentError::Provider(_) | AgentError::Timeout(_) => {
            HttpResponse::BadGateway().json(body)
        }
        AgentError::Internal(_) | AgentError::Database(_) | AgentError::Serialization(_) => {
            log::error!("internal error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_response(&AgentError::Validation("bad".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&AgentError::NotFound("task 1".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(&AgentError::AlreadyResolved(1)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_response(&AgentError::InvalidTransition {
                from: TaskStatus::Completed,
                to: TaskStatus::Processing,
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_response(&AgentError::Provider("503".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_response(&AgentError::Timeout(60)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_response(&AgentError::Internal("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
