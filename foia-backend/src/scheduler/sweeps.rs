//! Periodic sweeps over the request store
//!
//! Each sweep is an independently invocable operation with per-item error
//! isolation: one bad record is logged and counted, the rest of the sweep
//! keeps going. Reports are recomputed per run and returned, never stored.

use crate::agents::strategy::FollowUpContext;
use crate::agents::{AgentExecutor, AgentInput, AgentOutput};
use crate::db::Database;
use crate::error::AgentError;
use crate::models::FoiaRequest;
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Outcome counts for one sweep run
#[derive(Debug, Default, Clone, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Find overdue submitted requests and queue follow-up suggestions
///
/// A request is overdue when it was submitted more than `threshold_days` ago
/// and no response has arrived. Owners who have not enabled assistance are
/// skipped.
pub async fn overdue_sweep(
    db: &Arc<Database>,
    executor: &AgentExecutor,
    threshold_days: i64,
) -> Result<SweepReport, AgentError> {
    let cutoff = Utc::now() - Duration::days(threshold_days);
    let overdue = db.overdue_submitted_requests(cutoff)?;
    let mut report = SweepReport::default();

    log::info!("[SCHEDULER] overdue sweep: {} candidate(s)", overdue.len());

    for request in overdue {
        report.scanned += 1;
        if !assistance_enabled(db, &request) {
            report.skipped += 1;
            continue;
        }

        match suggest_followup(db, executor, &request).await {
            Ok(()) => report.processed += 1,
            Err(e) => {
                log::error!(
                    "[SCHEDULER] follow-up for request {} failed: {}",
                    request.id,
                    e
                );
                report.failed += 1;
            }
        }
    }

    log::info!(
        "[SCHEDULER] overdue sweep done: {} processed, {} skipped, {} failed",
        report.processed,
        report.skipped,
        report.failed
    );
    Ok(report)
}

/// Analyze received responses that nothing has summarized yet
///
/// Reads the most recent incoming communication for each matching request,
/// runs the analysis strategy, and writes the summary and follow-up flag back
/// onto the request. Requests with no incoming mail are skipped so a later
/// communication import can pick them up.
pub async fn analysis_sweep(
    db: &Arc<Database>,
    executor: &AgentExecutor,
) -> Result<SweepReport, AgentError> {
    let unanalyzed = db.unanalyzed_responded_requests()?;
    let mut report = SweepReport::default();

    log::info!(
        "[SCHEDULER] analysis sweep: {} candidate(s)",
        unanalyzed.len()
    );

    for request in unanalyzed {
        report.scanned += 1;
        if !assistance_enabled(db, &request) {
            report.skipped += 1;
            continue;
        }

        match analyze_response(db, executor, &request).await {
            Ok(true) => report.processed += 1,
            Ok(false) => {
                log::info!(
                    "[SCHEDULER] request {} has no incoming communication, skipping",
                    request.id
                );
                report.skipped += 1;
            }
            Err(e) => {
                log::error!(
                    "[SCHEDULER] analysis for request {} failed: {}",
                    request.id,
                    e
                );
                report.failed += 1;
            }
        }
    }

    log::info!(
        "[SCHEDULER] analysis sweep done: {} processed, {} skipped, {} failed",
        report.processed,
        report.skipped,
        report.failed
    );
    Ok(report)
}

fn assistance_enabled(db: &Database, request: &FoiaRequest) -> bool {
    match db.get_user(request.user_id) {
        Ok(Some(user)) => user.enable_agent_assistance,
        Ok(None) => {
            log::warn!(
                "[SCHEDULER] request {} has no owner (user {}), skipping",
                request.id,
                request.user_id
            );
            false
        }
        Err(e) => {
            log::error!("[SCHEDULER] could not load user {}: {}", request.user_id, e);
            false
        }
    }
}

async fn suggest_followup(
    db: &Arc<Database>,
    executor: &AgentExecutor,
    request: &FoiaRequest,
) -> Result<(), AgentError> {
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
        reason: "no_response".to_string(),
    };

    let (task, output) = executor.run(request.user_id, Some(request.id), input).await?;
    let AgentOutput::FollowUp(followup) = output else {
        return Err(AgentError::Internal(
            "follow-up strategy returned unexpected output".to_string(),
        ));
    };

    db.create_suggestion(
        request.user_id,
        request.id,
        Some(task.id),
        task.kind,
        "Suggested follow-up for overdue request",
        &format!("Your request has been pending for {days_elapsed} days."),
        &followup.followup_text,
    )?;
    log::info!(
        "[SCHEDULER] created follow-up suggestion for request {}",
        request.id
    );
    Ok(())
}

/// Returns Ok(false) when the request has no incoming communication
async fn analyze_response(
    db: &Arc<Database>,
    executor: &AgentExecutor,
    request: &FoiaRequest,
) -> Result<bool, AgentError> {
    let Some(comm) = db.latest_incoming_communication(request.id)? else {
        return Ok(false);
    };

    let input = AgentInput::Analyze {
        response_text: comm.content,
        original_request: request.request_body.clone(),
    };

    let (_task, output) = executor.run(request.user_id, Some(request.id), input).await?;
    let AgentOutput::Analysis(analysis) = output else {
        return Err(AgentError::Internal(
            "analysis strategy returned unexpected output".to_string(),
        ));
    };

    db.write_analysis(request.id, &analysis.summary, analysis.requires_followup)?;
    log::info!("[SCHEDULER] analyzed response for request {}", request.id);
    Ok(true)
}
