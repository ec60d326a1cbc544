//! Suggestion review endpoints
//!
//! Accept and reject are single atomic state changes; acting on an already
//! resolved suggestion surfaces a conflict instead of silently no-opping.

use crate::controllers::error_response;
use crate::AppState;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SuggestionListQuery {
    pub user_id: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct RejectRequest {
    pub feedback: Option<String>,
}

pub async fn pending(
    state: web::Data<AppState>,
    query: web::Query<SuggestionListQuery>,
) -> impl Responder {
    match state.db.pending_suggestions(query.user_id) {
        Ok(suggestions) => {
            HttpResponse::Ok().json(serde_json::json!({ "suggestions": suggestions }))
        }
        Err(e) => error_response(&e),
    }
}

pub async fn accept(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let suggestion_id = path.into_inner();
    match state.db.accept_suggestion(suggestion_id) {
        Ok(()) => {
            log::info!("suggestion {} accepted", suggestion_id);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Suggestion accepted"
            }))
        }
        Err(e) => error_response(&e),
    }
}

pub async fn reject(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: Option<web::Json<RejectRequest>>,
) -> impl Responder {
    let suggestion_id = path.into_inner();
    let feedback = body
        .map(|b| b.into_inner())
        .unwrap_or_default()
        .feedback;
    match state
        .db
        .reject_suggestion(suggestion_id, feedback.as_deref())
    {
        Ok(()) => {
            log::info!("suggestion {} rejected", suggestion_id);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Suggestion rejected"
            }))
        }
        Err(e) => error_response(&e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/agents/suggestions")
            .route("", web::get().to(pending))
            .route("/{id}/accept", web::post().to(accept))
            .route("/{id}/reject", web::post().to(reject)),
    );
}
