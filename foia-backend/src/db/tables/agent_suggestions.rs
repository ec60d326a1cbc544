//! Agent suggestion queue database operations
//!
//! Accept and reject race through compare-and-set updates guarded on both
//! flags being unset; the loser of the race sees AlreadyResolved and the
//! record keeps its first resolution.

use super::{parse_opt_ts, parse_ts};
use crate::db::Database;
use crate::error::AgentError;
use crate::models::{AgentSuggestion, TaskKind};
use chrono::Utc;
use rusqlite::params;

const SUGGESTION_COLUMNS: &str = "id, user_id, request_id, task_id, kind, title, description,
     suggested_text, is_accepted, is_rejected, feedback, created_at, resolved_at";

impl Database {
    /// Enqueue a suggestion for human review
    pub fn create_suggestion(
        &self,
        user_id: i64,
        request_id: i64,
        task_id: Option<i64>,
        kind: TaskKind,
        title: &str,
        description: &str,
        suggested_text: &str,
    ) -> Result<AgentSuggestion, AgentError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO agent_suggestions
             (user_id, request_id, task_id, kind, title, description, suggested_text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user_id,
                request_id,
                task_id,
                kind.to_string(),
                title,
                description,
                suggested_text,
                now.to_rfc3339(),
            ],
        )?;

        Ok(AgentSuggestion {
            id: conn.last_insert_rowid(),
            user_id,
            request_id,
            task_id,
            kind,
            title: title.to_string(),
            description: description.to_string(),
            suggested_text: suggested_text.to_string(),
            is_accepted: false,
            is_rejected: false,
            feedback: None,
            created_at: now,
            resolved_at: None,
        })
    }

    /// Accept a suggestion; fails if it was already accepted or rejected
    pub fn accept_suggestion(&self, suggestion_id: i64) -> Result<(), AgentError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE agent_suggestions SET is_accepted = 1, resolved_at = ?1
             WHERE id = ?2 AND is_accepted = 0 AND is_rejected = 0",
            params![Utc::now().to_rfc3339(), suggestion_id],
        )?;
        if updated == 0 {
            return Err(Self::resolution_error(&conn, suggestion_id));
        }
        Ok(())
    }

    /// Reject a suggestion with optional feedback; same guard as accept
    pub fn reject_suggestion(
        &self,
        suggestion_id: i64,
        feedback: Option<&str>,
    ) -> Result<(), AgentError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE agent_suggestions SET is_rejected = 1, feedback = ?1, resolved_at = ?2
             WHERE id = ?3 AND is_accepted = 0 AND is_rejected = 0",
            params![feedback, Utc::now().to_rfc3339(), suggestion_id],
        )?;
        if updated == 0 {
            return Err(Self::resolution_error(&conn, suggestion_id));
        }
        Ok(())
    }

    pub fn get_suggestion(
        &self,
        suggestion_id: i64,
    ) -> Result<Option<AgentSuggestion>, AgentError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUGGESTION_COLUMNS} FROM agent_suggestions WHERE id = ?1"
        ))?;
        let result = stmt.query_row(params![suggestion_id], Self::row_to_suggestion);
        match result {
            Ok(suggestion) => Ok(Some(suggestion)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Suggestions awaiting a decision from this user, newest first
    pub fn pending_suggestions(&self, user_id: i64) -> Result<Vec<AgentSuggestion>, AgentError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUGGESTION_COLUMNS} FROM agent_suggestions
             WHERE user_id = ?1 AND is_accepted = 0 AND is_rejected = 0
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![user_id], Self::row_to_suggestion)?;
        let mut suggestions = Vec::new();
        for row in rows {
            suggestions.push(row?);
        }
        Ok(suggestions)
    }

    fn resolution_error(conn: &rusqlite::Connection, suggestion_id: i64) -> AgentError {
        let exists: Result<i64, _> = conn.query_row(
            "SELECT COUNT(*) FROM agent_suggestions WHERE id = ?1",
            params![suggestion_id],
            |row| row.get(0),
        );
        match exists {
            Ok(0) => AgentError::NotFound(format!("suggestion {suggestion_id}")),
            Ok(_) => AgentError::AlreadyResolved(suggestion_id),
            Err(e) => AgentError::Database(e),
        }
    }

    fn row_to_suggestion(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentSuggestion> {
        let kind_str: String = row.get(4)?;
        let created_at_str: String = row.get(11)?;
        let resolved_at_str: Option<String> = row.get(12)?;

        Ok(AgentSuggestion {
            id: row.get(0)?,
            user_id: row.get(1)?,
            request_id: row.get(2)?,
            task_id: row.get(3)?,
            kind: TaskKind::from_str(&kind_str).unwrap_or(TaskKind::FollowUp),
            title: row.get(5)?,
            description: row.get(6)?,
            suggested_text: row.get(7)?,
            is_accepted: row.get::<_, i32>(8)? != 0,
            is_rejected: row.get::<_, i32>(9)? != 0,
            feedback: row.get(10)?,
            created_at: parse_ts(&created_at_str),
            resolved_at: parse_opt_ts(resolved_at_str),
        })
    }
}
