//! FOIA request and communication database operations
//!
//! Collaborator surface for the agent core: creation and the status writes
//! the workflow needs, plus the two filter predicates the scheduler sweeps
//! run on.

use super::{parse_opt_ts, parse_ts};
use crate::db::Database;
use crate::error::AgentError;
use crate::models::{Communication, Direction, FoiaRequest, NewFoiaRequest, RequestStatus};
use chrono::{DateTime, Utc};
use rusqlite::params;

const REQUEST_COLUMNS: &str = "id, user_id, title, request_body, agency_name, agency_type, status,
     submitted_at, tracking_number, response_received, response_summary, requires_followup,
     is_deleted, created_at, updated_at";

impl Database {
    pub fn create_foia_request(&self, new: &NewFoiaRequest) -> Result<FoiaRequest, AgentError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        conn.execute(
            "INSERT INTO foia_requests
             (user_id, title, request_body, agency_name, agency_type, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                new.user_id,
                new.title,
                new.request_body,
                new.agency_name,
                new.agency_type,
                now_str,
            ],
        )?;

        Ok(FoiaRequest {
            id: conn.last_insert_rowid(),
            user_id: new.user_id,
            title: new.title.clone(),
            request_body: new.request_body.clone(),
            agency_name: new.agency_name.clone(),
            agency_type: new.agency_type.clone(),
            status: RequestStatus::Draft,
            submitted_at: None,
            tracking_number: None,
            response_received: false,
            response_summary: String::new(),
            requires_followup: false,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_foia_request(&self, request_id: i64) -> Result<Option<FoiaRequest>, AgentError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM foia_requests WHERE id = ?1"
        ))?;
        let result = stmt.query_row(params![request_id], Self::row_to_request);
        match result {
            Ok(request) => Ok(Some(request)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Move a request into the submitted state
    ///
    /// submitted_at is caller-supplied so imports can backfill historical
    /// submission dates.
    pub fn mark_request_submitted(
        &self,
        request_id: i64,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), AgentError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE foia_requests SET status = 'submitted', submitted_at = ?1, updated_at = ?2
             WHERE id = ?3",
            params![
                submitted_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
                request_id
            ],
        )?;
        Ok(())
    }

    pub fn record_response_received(&self, request_id: i64) -> Result<(), AgentError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE foia_requests SET response_received = 1, updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), request_id],
        )?;
        Ok(())
    }

    /// Write agent analysis back onto the request
    pub fn write_analysis(
        &self,
        request_id: i64,
        summary: &str,
        requires_followup: bool,
    ) -> Result<(), AgentError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE foia_requests
             SET response_summary = ?1, requires_followup = ?2, updated_at = ?3
             WHERE id = ?4",
            params![
                summary,
                requires_followup as i32,
                Utc::now().to_rfc3339(),
                request_id
            ],
        )?;
        Ok(())
    }

    /// Submitted requests with no response whose submission predates the cutoff
    pub fn overdue_submitted_requests(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<FoiaRequest>, AgentError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM foia_requests
             WHERE status = 'submitted'
               AND response_received = 0
               AND is_deleted = 0
               AND submitted_at IS NOT NULL
               AND submitted_at < ?1
             ORDER BY submitted_at ASC"
        ))?;
        let rows = stmt.query_map(params![cutoff.to_rfc3339()], Self::row_to_request)?;
        let mut requests = Vec::new();
        for row in rows {
            requests.push(row?);
        }
        Ok(requests)
    }

    /// Requests with a received response that nothing has analyzed yet
    pub fn unanalyzed_responded_requests(&self) -> Result<Vec<FoiaRequest>, AgentError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {REQUEST_COLUMNS} FROM foia_requests
             WHERE response_received = 1
               AND response_summary = ''
               AND is_deleted = 0
             ORDER BY updated_at ASC"
        ))?;
        let rows = stmt.query_map([], Self::row_to_request)?;
        let mut requests = Vec::new();
        for row in rows {
            requests.push(row?);
        }
        Ok(requests)
    }

    pub fn add_communication(
        &self,
        request_id: i64,
        direction: Direction,
        subject: Option<&str>,
        content: &str,
    ) -> Result<Communication, AgentError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO communications (request_id, direction, subject, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request_id,
                direction.to_string(),
                subject,
                content,
                now.to_rfc3339(),
            ],
        )?;

        Ok(Communication {
            id: conn.last_insert_rowid(),
            request_id,
            direction,
            subject: subject.map(|s| s.to_string()),
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Most recent incoming communication on a request, if any
    pub fn latest_incoming_communication(
        &self,
        request_id: i64,
    ) -> Result<Option<Communication>, AgentError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, request_id, direction, subject, content, created_at
             FROM communications
             WHERE request_id = ?1 AND direction = 'incoming'
             ORDER BY created_at DESC, id DESC LIMIT 1",
        )?;
        let result = stmt.query_row(params![request_id], |row| {
            let direction_str: String = row.get(2)?;
            let created_at_str: String = row.get(5)?;
            Ok(Communication {
                id: row.get(0)?,
                request_id: row.get(1)?,
                direction: Direction::from_str(&direction_str).unwrap_or(Direction::Incoming),
                subject: row.get(3)?,
                content: row.get(4)?,
                created_at: parse_ts(&created_at_str),
            })
        });
        match result {
            Ok(comm) => Ok(Some(comm)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn row_to_request(row: &rusqlite::Row<'_>) -> rusqlite::Result<FoiaRequest> {
        let status_str: String = row.get(6)?;
        let submitted_at_str: Option<String> = row.get(7)?;
        let created_at_str: String = row.get(13)?;
        let updated_at_str: String = row.get(14)?;

        Ok(FoiaRequest {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            request_body: row.get(3)?,
            agency_name: row.get(4)?,
            agency_type: row.get(5)?,
            status: RequestStatus::from_str(&status_str).unwrap_or(RequestStatus::Draft),
            submitted_at: parse_opt_ts(submitted_at_str),
            tracking_number: row.get(8)?,
            response_received: row.get::<_, i32>(9)? != 0,
            response_summary: row.get(10)?,
            requires_followup: row.get::<_, i32>(11)? != 0,
            is_deleted: row.get::<_, i32>(12)? != 0,
            created_at: parse_ts(&created_at_str),
            updated_at: parse_ts(&updated_at_str),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request_for(db: &Database, user_id: i64, title: &str, agency: &str) -> FoiaRequest {
        db.create_foia_request(&NewFoiaRequest {
            user_id,
            title: title.to_string(),
            request_body: "All records".to_string(),
            agency_name: agency.to_string(),
            agency_type: "federal".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_overdue_filter() {
        let db = Database::new(":memory:").unwrap();
        let user = db.create_user("sweep@example.com", true).unwrap();

        let old = request_for(&db, user.id, "Old request", "DOT");
        db.mark_request_submitted(old.id, Utc::now() - Duration::days(30))
            .unwrap();

        let fresh = request_for(&db, user.id, "Fresh request", "EPA");
        db.mark_request_submitted(fresh.id, Utc::now() - Duration::days(5))
            .unwrap();

        // never submitted, must not match
        request_for(&db, user.id, "Draft request", "DOJ");

        let cutoff = Utc::now() - Duration::days(20);
        let overdue = db.overdue_submitted_requests(cutoff).unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, old.id);
    }

    #[test]
    fn test_overdue_excludes_responded() {
        let db = Database::new(":memory:").unwrap();
        let user = db.create_user("sweep@example.com", true).unwrap();
        let request = request_for(&db, user.id, "Answered", "DOT");
        db.mark_request_submitted(request.id, Utc::now() - Duration::days(30))
            .unwrap();
        db.record_response_received(request.id).unwrap();

        let cutoff = Utc::now() - Duration::days(20);
        assert!(db.overdue_submitted_requests(cutoff).unwrap().is_empty());
    }

    #[test]
    fn test_unanalyzed_filter_clears_after_write_back() {
        let db = Database::new(":memory:").unwrap();
        let user = db.create_user("sweep@example.com", true).unwrap();
        let request = request_for(&db, user.id, "Answered", "DOT");
        db.record_response_received(request.id).unwrap();

        assert_eq!(db.unanalyzed_responded_requests().unwrap().len(), 1);

        db.write_analysis(request.id, "Partial production.", true)
            .unwrap();
        assert!(db.unanalyzed_responded_requests().unwrap().is_empty());

        let stored = db.get_foia_request(request.id).unwrap().unwrap();
        assert_eq!(stored.response_summary, "Partial production.");
        assert!(stored.requires_followup);
    }

    #[test]
    fn test_latest_incoming_communication() {
        let db = Database::new(":memory:").unwrap();
        let user = db.create_user("mail@example.com", true).unwrap();
        let request = request_for(&db, user.id, "Records", "DOT");

        assert!(db
            .latest_incoming_communication(request.id)
            .unwrap()
            .is_none());

        db.add_communication(request.id, Direction::Outgoing, None, "Our request")
            .unwrap();
        db.add_communication(request.id, Direction::Incoming, Some("Re:"), "First reply")
            .unwrap();
        let second = db
            .add_communication(request.id, Direction::Incoming, Some("Re:"), "Second reply")
            .unwrap();

        let latest = db
            .latest_incoming_communication(request.id)
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(latest.content, "Second reply");
    }
}
