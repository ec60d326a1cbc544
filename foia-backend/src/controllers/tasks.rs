//! Task ledger endpoints
//!
//! Read-only: the ledger is only ever written by strategy execution.

use crate::controllers::error_response;
use crate::AppState;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub user_id: i64,
    pub limit: Option<usize>,
}

pub async fn list_tasks(
    state: web::Data<AppState>,
    query: web::Query<TaskListQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    match state.db.recent_agent_tasks(query.user_id, limit) {
        Ok(tasks) => HttpResponse::Ok().json(serde_json::json!({ "tasks": tasks })),
        Err(e) => error_response(&e),
    }
}

pub async fn task_detail(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let task_id = path.into_inner();
    match state.db.get_agent_task(task_id) {
        Ok(Some(task)) => HttpResponse::Ok().json(task),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("agent task {} not found", task_id)
        })),
        Err(e) => error_response(&e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/agents/tasks")
            .route("", web::get().to(list_tasks))
            .route("/{id}", web::get().to(task_detail)),
    );
}
