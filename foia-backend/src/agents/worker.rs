//! Background execution - a job queue consumed by a worker pool
//!
//! Jobs carry a pre-opened pending ledger entry, so callers get a task id
//! back before any work happens and the ledger row is the only surface a
//! fire-and-forget failure is reported on.

use crate::agents::{AgentExecutor, AgentInput};
use crate::error::AgentError;
use crate::models::AgentTask;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Queue capacity before submit applies backpressure
const QUEUE_DEPTH: usize = 64;

/// One queued agent invocation
#[derive(Debug)]
pub struct AgentJob {
    /// Correlation id for log lines across submit and execution
    pub job_id: String,
    pub task: AgentTask,
    pub input: AgentInput,
}

impl AgentJob {
    pub fn new(task: AgentTask, input: AgentInput) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            task,
            input,
        }
    }
}

pub struct WorkerPool {
    sender: mpsc::Sender<AgentJob>,
    shutdown: CancellationToken,
}

impl WorkerPool {
    /// Spawn `size` workers consuming a shared queue
    pub fn start(size: usize, executor: Arc<AgentExecutor>) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_DEPTH);
        let receiver = Arc::new(Mutex::new(receiver));
        let shutdown = CancellationToken::new();

        for worker_id in 0..size.max(1) {
            let receiver = Arc::clone(&receiver);
            let executor = Arc::clone(&executor);
            let token = shutdown.clone();
            tokio::spawn(async move {
                worker_loop(worker_id, receiver, executor, token).await;
            });
        }

        Self { sender, shutdown }
    }

    /// Queue a job; returns as soon as the job is enqueued
    pub async fn submit(&self, job: AgentJob) -> Result<(), AgentError> {
        log::info!(
            "[WORKER] queued job {} (task {}, {})",
            job.job_id,
            job.task.id,
            job.task.kind
        );
        self.sender
            .send(job)
            .await
            .map_err(|_| AgentError::Internal("worker pool is shut down".to_string()))
    }

    /// Stop all workers; queued jobs that were not picked up are dropped
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<AgentJob>>>,
    executor: Arc<AgentExecutor>,
    shutdown: CancellationToken,
) {
    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            tokio::select! {
                _ = shutdown.cancelled() => None,
                job = receiver.recv() => job,
            }
        };

        let Some(job) = job else {
            log::info!("[WORKER] worker {} stopping", worker_id);
            break;
        };

        log::info!(
            "[WORKER] worker {} running job {} (task {})",
            worker_id,
            job.job_id,
            job.task.id
        );
        if let Err(e) = executor.run_opened(&job.task, &job.input).await {
            // already recorded on the ledger entry; nothing else to notify
            log::warn!("[WORKER] job {} failed: {}", job.job_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::StaticGateway;
    use crate::db::Database;
    use crate::models::TaskStatus;
    use std::time::Duration;

    async fn wait_for_terminal(db: &Database, task_id: i64) -> TaskStatus {
        for _ in 0..100 {
            let task = db.get_agent_task(task_id).unwrap().unwrap();
            if task.status.is_terminal() {
                return task.status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {} never reached a terminal state", task_id);
    }

    #[tokio::test]
    async fn test_submitted_job_completes_in_background() {
        let db = Arc::new(Database::new(":memory:").unwrap());
        db.create_user("worker@example.com", true).unwrap();
        let executor = Arc::new(AgentExecutor::new(
            db.clone(),
            Arc::new(StaticGateway::new("Dear Records Officer,")),
            "gpt-4o",
        ));
        let pool = WorkerPool::start(2, executor.clone());

        let input = AgentInput::Draft {
            description: "inspection records".to_string(),
            agency_name: "DOT".to_string(),
            agency_type: "federal".to_string(),
        };
        let task = executor.open(1, None, &input).unwrap();
        pool.submit(AgentJob::new(task.clone(), input)).await.unwrap();

        assert_eq!(wait_for_terminal(&db, task.id).await, TaskStatus::Completed);
        pool.shutdown();
    }

    #[tokio::test]
    async fn test_invalid_job_fails_on_ledger_only() {
        let db = Arc::new(Database::new(":memory:").unwrap());
        db.create_user("worker@example.com", true).unwrap();
        let executor = Arc::new(AgentExecutor::new(
            db.clone(),
            Arc::new(StaticGateway::new("unused")),
            "gpt-4o",
        ));
        let pool = WorkerPool::start(1, executor.clone());

        let input = AgentInput::Draft {
            description: String::new(),
            agency_name: "DOT".to_string(),
            agency_type: "federal".to_string(),
        };
        let task = executor.open(1, None, &input).unwrap();
        pool.submit(AgentJob::new(task.clone(), input)).await.unwrap();

        assert_eq!(wait_for_terminal(&db, task.id).await, TaskStatus::Failed);
        let stored = db.get_agent_task(task.id).unwrap().unwrap();
        assert!(stored.error.is_some());
        pool.shutdown();
    }
}
