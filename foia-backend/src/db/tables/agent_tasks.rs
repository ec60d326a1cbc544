//! Agent task ledger database operations
//!
//! The ledger is append-mostly: rows are inserted as pending and advanced
//! through the state machine with compare-and-set updates. A zero-row update
//! means the guard lost, and the current status decides which error to
//! surface. Rows are never deleted.

use super::{parse_opt_ts, parse_ts};
use crate::db::Database;
use crate::error::AgentError;
use crate::models::{AgentTask, TaskKind, TaskStatus};
use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::Value;

const TASK_COLUMNS: &str = "id, kind, status, user_id, request_id, input, output, error, model,
     tokens_used, created_at, started_at, completed_at";

impl Database {
    /// Open a pending ledger entry for an agent invocation
    pub fn create_agent_task(
        &self,
        kind: TaskKind,
        user_id: i64,
        request_id: Option<i64>,
        input: &Value,
        model: &str,
    ) -> Result<AgentTask, AgentError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        let input_json = serde_json::to_string(input)?;

        conn.execute(
            "INSERT INTO agent_tasks (kind, status, user_id, request_id, input, model, created_at)
             VALUES (?1, 'pending', ?2, ?3, ?4, ?5, ?6)",
            params![
                kind.to_string(),
                user_id,
                request_id,
                input_json,
                model,
                now.to_rfc3339(),
            ],
        )?;

        Ok(AgentTask {
            id: conn.last_insert_rowid(),
            kind,
            status: TaskStatus::Pending,
            user_id,
            request_id,
            input: input.clone(),
            output: None,
            error: None,
            model: model.to_string(),
            tokens_used: None,
            created_at: now,
            started_at: None,
            completed_at: None,
        })
    }

    /// Transition pending -> processing, stamping started_at
    pub fn mark_task_processing(&self, task_id: i64) -> Result<(), AgentError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE agent_tasks SET status = 'processing', started_at = ?1
             WHERE id = ?2 AND status = 'pending'",
            params![Utc::now().to_rfc3339(), task_id],
        )?;
        if updated == 0 {
            return Err(Self::transition_error(&conn, task_id, TaskStatus::Processing));
        }
        Ok(())
    }

    /// Transition processing -> completed with output and token count
    pub fn complete_agent_task(
        &self,
        task_id: i64,
        output: &Value,
        tokens_used: i64,
    ) -> Result<(), AgentError> {
        let conn = self.conn.lock().unwrap();
        let output_json = serde_json::to_string(output)?;
        let updated = conn.execute(
            "UPDATE agent_tasks
             SET status = 'completed', output = ?1, tokens_used = ?2, completed_at = ?3
             WHERE id = ?4 AND status = 'processing'",
            params![output_json, tokens_used, Utc::now().to_rfc3339(), task_id],
        )?;
        if updated == 0 {
            return Err(Self::transition_error(&conn, task_id, TaskStatus::Completed));
        }
        Ok(())
    }

    /// Record a failure with its error message
    ///
    /// Accepts pending as well as processing, so a queued job that dies
    /// before a worker picks it up still reaches a terminal state.
    pub fn fail_agent_task(&self, task_id: i64, error: &str) -> Result<(), AgentError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE agent_tasks SET status = 'failed', error = ?1, completed_at = ?2
             WHERE id = ?3 AND status IN ('pending', 'processing')",
            params![error, Utc::now().to_rfc3339(), task_id],
        )?;
        if updated == 0 {
            return Err(Self::transition_error(&conn, task_id, TaskStatus::Failed));
        }
        Ok(())
    }

    pub fn get_agent_task(&self, task_id: i64) -> Result<Option<AgentTask>, AgentError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM agent_tasks WHERE id = ?1"
        ))?;
        let result = stmt.query_row(params![task_id], Self::row_to_task);
        match result {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Most recent tasks for a user, newest first
    pub fn recent_agent_tasks(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<AgentTask>, AgentError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM agent_tasks
             WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![user_id, limit as i64], Self::row_to_task)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Resolve a failed compare-and-set into the right error
    fn transition_error(conn: &Connection, task_id: i64, to: TaskStatus) -> AgentError {
        let current: Result<String, _> = conn.query_row(
            "SELECT status FROM agent_tasks WHERE id = ?1",
            params![task_id],
            |row| row.get(0),
        );
        match current {
            Ok(status) => AgentError::InvalidTransition {
                from: TaskStatus::from_str(&status).unwrap_or(TaskStatus::Failed),
                to,
            },
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                AgentError::NotFound(format!("agent task {task_id}"))
            }
            Err(e) => AgentError::Database(e),
        }
    }

    fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentTask> {
        let kind_str: String = row.get(1)?;
        let status_str: String = row.get(2)?;
        let input_json: String = row.get(5)?;
        let output_json: Option<String> = row.get(6)?;
        let created_at_str: String = row.get(10)?;
        let started_at_str: Option<String> = row.get(11)?;
        let completed_at_str: Option<String> = row.get(12)?;

        Ok(AgentTask {
            id: row.get(0)?,
            kind: TaskKind::from_str(&kind_str).unwrap_or(TaskKind::Draft),
            status: TaskStatus::from_str(&status_str).unwrap_or(TaskStatus::Failed),
            user_id: row.get(3)?,
            request_id: row.get(4)?,
            input: serde_json::from_str(&input_json).unwrap_or(Value::Null),
            output: output_json.and_then(|s| serde_json::from_str(&s).ok()),
            error: row.get(7)?,
            model: row.get(8)?,
            tokens_used: row.get(9)?,
            created_at: parse_ts(&created_at_str),
            started_at: parse_opt_ts(started_at_str),
            completed_at: parse_opt_ts(completed_at_str),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_db() -> Database {
        let db = Database::new(":memory:").unwrap();
        db.create_user("ledger@example.com", true).unwrap();
        db
    }

    fn open_task(db: &Database) -> AgentTask {
        db.create_agent_task(
            TaskKind::Draft,
            1,
            None,
            &json!({"description": "records"}),
            "gpt-4o",
        )
        .unwrap()
    }

    #[test]
    fn test_full_lifecycle() {
        let db = test_db();
        let task = open_task(&db);
        assert_eq!(task.status, TaskStatus::Pending);

        db.mark_task_processing(task.id).unwrap();
        db.complete_agent_task(task.id, &json!({"request_text": "Dear"}), 42)
            .unwrap();

        let stored = db.get_agent_task(task.id).unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Completed);
        assert_eq!(stored.tokens_used, Some(42));
        assert!(stored.started_at.is_some());
        assert!(stored.completed_at.is_some());
        assert_eq!(stored.output.unwrap()["request_text"], "Dear");
    }

    #[test]
    fn test_complete_requires_processing() {
        let db = test_db();
        let task = open_task(&db);

        let err = db
            .complete_agent_task(task.id, &json!({}), 0)
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidTransition {
                from: TaskStatus::Pending,
                to: TaskStatus::Completed,
            }
        ));
    }

    #[test]
    fn test_terminal_states_reject_all_transitions() {
        let db = test_db();
        let task = open_task(&db);
        db.mark_task_processing(task.id).unwrap();
        db.fail_agent_task(task.id, "provider error: boom").unwrap();

        assert!(matches!(
            db.mark_task_processing(task.id).unwrap_err(),
            AgentError::InvalidTransition { from: TaskStatus::Failed, .. }
        ));
        assert!(matches!(
            db.complete_agent_task(task.id, &json!({}), 0).unwrap_err(),
            AgentError::InvalidTransition { from: TaskStatus::Failed, .. }
        ));
        assert!(matches!(
            db.fail_agent_task(task.id, "again").unwrap_err(),
            AgentError::InvalidTransition { from: TaskStatus::Failed, .. }
        ));

        // error message must survive the rejected retries
        let stored = db.get_agent_task(task.id).unwrap().unwrap();
        assert_eq!(stored.error.as_deref(), Some("provider error: boom"));
    }

    #[test]
    fn test_fail_from_pending_is_allowed() {
        let db = test_db();
        let task = open_task(&db);
        db.fail_agent_task(task.id, "worker never started").unwrap();
        let stored = db.get_agent_task(task.id).unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Failed);
    }

    #[test]
    fn test_unknown_task() {
        let db = test_db();
        assert!(db.get_agent_task(999).unwrap().is_none());
        assert!(matches!(
            db.mark_task_processing(999).unwrap_err(),
            AgentError::NotFound(_)
        ));
    }

    #[test]
    fn test_recent_tasks_ordering() {
        let db = test_db();
        for _ in 0..3 {
            open_task(&db);
        }
        let tasks = db.recent_agent_tasks(1, 2).unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].id >= tasks[1].id);
    }
}
