//! Agent invocation endpoints
//!
//! The synchronous endpoints run the strategy inline and return its output;
//! /jobs opens a ledger entry, queues the work, and returns immediately with
//! the task id so callers can poll the task endpoints.

use crate::agents::strategy::FollowUpContext;
use crate::agents::worker::AgentJob;
use crate::agents::{AgentInput, AgentOutput};
use crate::controllers::error_response;
use crate::error::AgentError;
use crate::models::FoiaRequest;
use crate::scheduler::{analysis_sweep, overdue_sweep};
use crate::AppState;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;

fn default_agency_type() -> String {
    "federal".to_string()
}

fn default_reason() -> String {
    "no_response".to_string()
}

fn default_document_type() -> String {
    "document".to_string()
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub user_id: i64,
    pub description: String,
    pub agency_name: String,
    #[serde(default = "default_agency_type")]
    pub agency_type: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: i64,
    pub response_text: String,
}

#[derive(Debug, Deserialize)]
pub struct FollowUpRequest {
    pub user_id: i64,
    #[serde(default = "default_reason")]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub user_id: i64,
    pub document_content: String,
    #[serde(default = "default_document_type")]
    pub document_type: String,
}

#[derive(Debug, Deserialize)]
pub struct JobRequest {
    pub user_id: i64,
    pub request_id: Option<i64>,
    #[serde(flatten)]
    pub input: AgentInput,
}

/// Load a request and check it belongs to the calling user
fn owned_request(
    state: &web::Data<AppState>,
    request_id: i64,
    user_id: i64,
) -> Result<FoiaRequest, AgentError> {
    match state.db.get_foia_request(request_id)? {
        Some(request) if request.user_id == user_id && !request.is_deleted => Ok(request),
        _ => Err(AgentError::NotFound(format!("request {request_id}"))),
    }
}

pub async fn draft(state: web::Data<AppState>, body: web::Json<DraftRequest>) -> impl Responder {
    let req = body.into_inner();
    let input = AgentInput::Draft {
        description: req.description,
        agency_name: req.agency_name,
        agency_type: req.agency_type,
    };

    match state.executor.run(req.user_id, None, input).await {
        Ok((task, AgentOutput::Draft(draft))) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "task_id": task.id,
            "request_text": draft.request_text,
            "suggestions": draft.suggestions,
        })),
        Ok(_) => error_response(&AgentError::Internal(
            "draft strategy returned unexpected output".to_string(),
        )),
        Err(e) => error_response(&e),
    }
}

pub async fn analyze(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<AnalyzeRequest>,
) -> impl Responder {
    let request_id = path.into_inner();
    let req = body.into_inner();

    let request = match owned_request(&state, request_id, req.user_id) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    let input = AgentInput::Analyze {
        response_text: req.response_text,
        original_request: request.request_body.clone(),
    };

    match state.executor.run(req.user_id, Some(request.id), input).await {
        Ok((task, AgentOutput::Analysis(analysis))) => {
            if let Err(e) =
                state
                    .db
                    .write_analysis(request.id, &analysis.summary, analysis.requires_followup)
            {
                return error_response(&e);
            }
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "task_id": task.id,
                "analysis": analysis,
            }))
        }
        Ok(_) => error_response(&AgentError::Internal(
            "analysis strategy returned unexpected output".to_string(),
        )),
        Err(e) => error_response(&e),
    }
}

pub async fn follow_up(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<FollowUpRequest>,
) -> impl Responder {
    let request_id = path.into_inner();
    let req = body.into_inner();

    let request = match owned_request(&state, request_id, req.user_id) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    let days_elapsed = request
        .submitted_at
        .map(|submitted| (Utc::now() - submitted).num_days())
        .unwrap_or(0);
    let input = AgentInput::FollowUp {
        context: FollowUpContext {
            title: request.title.clone(),
            agency: request.agency_name.clone(),
            days_elapsed,
        },
        reason: req.reason,
    };

    match state.executor.run(req.user_id, Some(request.id), input).await {
        Ok((task, AgentOutput::FollowUp(followup))) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "task_id": task.id,
            "followup": followup,
        })),
        Ok(_) => error_response(&AgentError::Internal(
            "follow-up strategy returned unexpected output".to_string(),
        )),
        Err(e) => error_response(&e),
    }
}

pub async fn summarize(
    state: web::Data<AppState>,
    body: web::Json<SummarizeRequest>,
) -> impl Responder {
    let req = body.into_inner();
    let input = AgentInput::Summarize {
        document_content: req.document_content,
        document_type: req.document_type,
    };

    match state.executor.run(req.user_id, None, input).await {
        Ok((task, AgentOutput::Summary(summary))) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "task_id": task.id,
            "summary": summary.summary,
            "key_points": summary.key_points,
            "word_count": summary.word_count,
        })),
        Ok(_) => error_response(&AgentError::Internal(
            "summary strategy returned unexpected output".to_string(),
        )),
        Err(e) => error_response(&e),
    }
}

/// Queue an invocation for background execution
pub async fn submit_job(state: web::Data<AppState>, body: web::Json<JobRequest>) -> impl Responder {
    let req = body.into_inner();

    if let Some(request_id) = req.request_id {
        if let Err(e) = owned_request(&state, request_id, req.user_id) {
            return error_response(&e);
        }
    }

    let task = match state.executor.open(req.user_id, req.request_id, &req.input) {
        Ok(task) => task,
        Err(e) => return error_response(&e),
    };

    let job = AgentJob::new(task.clone(), req.input);
    if let Err(e) = state.worker_pool.submit(job).await {
        // the pool is gone; leave the row terminal so it never looks stuck
        if let Err(ledger_err) = state.db.fail_agent_task(task.id, &e.to_string()) {
            log::error!("could not fail orphaned task {}: {}", task.id, ledger_err);
        }
        return error_response(&e);
    }

    HttpResponse::Accepted().json(serde_json::json!({
        "success": true,
        "task_id": task.id,
        "status": task.status,
    }))
}

/// Trigger the overdue sweep outside its schedule
pub async fn run_overdue_sweep(state: web::Data<AppState>) -> impl Responder {
    match overdue_sweep(
        &state.db,
        &state.executor,
        state.config.overdue_threshold_days,
    )
    .await
    {
        Ok(report) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "report": report,
        })),
        Err(e) => error_response(&e),
    }
}

/// Trigger the response analysis sweep outside its schedule
pub async fn run_analysis_sweep(state: web::Data<AppState>) -> impl Responder {
    match analysis_sweep(&state.db, &state.executor).await {
        Ok(report) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "report": report,
        })),
        Err(e) => error_response(&e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/agents")
            .route("/draft", web::post().to(draft))
            .route("/requests/{id}/analyze", web::post().to(analyze))
            .route("/requests/{id}/follow-up", web::post().to(follow_up))
            .route("/summarize", web::post().to(summarize))
            .route("/jobs", web::post().to(submit_job))
            .route("/sweeps/overdue", web::post().to(run_overdue_sweep))
            .route("/sweeps/analysis", web::post().to(run_analysis_sweep)),
    );
}
