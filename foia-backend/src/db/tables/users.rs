//! User profile database operations

use super::parse_ts;
use crate::db::Database;
use crate::error::AgentError;
use crate::models::UserProfile;
use chrono::Utc;
use rusqlite::params;

impl Database {
    pub fn create_user(
        &self,
        email: &str,
        enable_agent_assistance: bool,
    ) -> Result<UserProfile, AgentError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (email, enable_agent_assistance, created_at) VALUES (?1, ?2, ?3)",
            params![email, enable_agent_assistance as i32, now.to_rfc3339()],
        )?;

        Ok(UserProfile {
            id: conn.last_insert_rowid(),
            email: email.to_string(),
            enable_agent_assistance,
            created_at: now,
        })
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<UserProfile>, AgentError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, email, enable_agent_assistance, created_at FROM users WHERE id = ?1",
        )?;
        let result = stmt.query_row(params![user_id], |row| {
            let created_at_str: String = row.get(3)?;
            Ok(UserProfile {
                id: row.get(0)?,
                email: row.get(1)?,
                enable_agent_assistance: row.get::<_, i32>(2)? != 0,
                created_at: parse_ts(&created_at_str),
            })
        });
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_agent_assistance(&self, user_id: i64, enabled: bool) -> Result<(), AgentError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE users SET enable_agent_assistance = ?1 WHERE id = ?2",
            params![enabled as i32, user_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistance_flag_round_trip() {
        let db = Database::new(":memory:").unwrap();
        let user = db.create_user("flag@example.com", true).unwrap();
        assert!(user.enable_agent_assistance);

        db.set_agent_assistance(user.id, false).unwrap();
        let stored = db.get_user(user.id).unwrap().unwrap();
        assert!(!stored.enable_agent_assistance);
    }
}
