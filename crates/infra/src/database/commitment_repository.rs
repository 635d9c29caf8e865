//! SQLite-backed implementation of the CommitmentStore port.
//!
//! The external-id columns are the link registry: they are written and
//! cleared field-by-field so concurrent sync passes never clobber links
//! they did not touch.

use async_trait::async_trait;
use cadence_core::CommitmentStore;
use cadence_domain::{
    CadenceError, Commitment, CommitmentStatus, ExternalLink, Priority, Result, TaskType,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, instrument};

use super::manager::Database;
use crate::errors::InfraError;

const COMMITMENT_COLUMNS: &str = "id, profile_id, description, assignee, deadline, status, \
     task_type, priority, calendar_event_id, jira_task_id, microsoft_task_id, \
     completion_note, created_at, updated_at";

/// SQLite implementation of the commitment store.
pub struct SqliteCommitmentRepository {
    db: Database,
}

impl SqliteCommitmentRepository {
    /// Create a new commitment repository.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new commitment row.
    #[instrument(skip(self, commitment))]
    pub fn insert(&self, commitment: &Commitment) -> Result<()> {
        let conn = self.db.get()?;

        conn.execute(
            "INSERT INTO commitments (
                id, profile_id, description, assignee, deadline, status,
                task_type, priority, calendar_event_id, jira_task_id,
                microsoft_task_id, completion_note, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                commitment.id,
                commitment.profile_id,
                commitment.description,
                commitment.assignee,
                commitment.deadline.map(|d| d.timestamp()),
                commitment.status.as_str(),
                commitment.task_type.as_str(),
                commitment.priority.as_str(),
                commitment.calendar_event_id,
                commitment.jira_task_id,
                commitment.microsoft_task_id,
                commitment.completion_note,
                commitment.created_at,
                commitment.updated_at
            ],
        )
        .map_err(InfraError::from)?;

        debug!(commitment_id = %commitment.id, "inserted commitment");

        Ok(())
    }

    /// Update status and completion note.
    #[instrument(skip(self))]
    pub fn update_status(
        &self,
        commitment_id: &str,
        status: CommitmentStatus,
        completion_note: Option<&str>,
    ) -> Result<()> {
        let conn = self.db.get()?;

        let changed = conn
            .execute(
                "UPDATE commitments SET status = ?2, completion_note = ?3, updated_at = ?4
                 WHERE id = ?1",
                params![
                    commitment_id,
                    status.as_str(),
                    completion_note,
                    Utc::now().timestamp()
                ],
            )
            .map_err(InfraError::from)?;

        if changed == 0 {
            return Err(CadenceError::NotFound(format!("commitment {commitment_id}")));
        }

        Ok(())
    }

    /// Delete a commitment row. Always succeeds for a missing row.
    #[instrument(skip(self))]
    pub fn delete(&self, commitment_id: &str) -> Result<()> {
        let conn = self.db.get()?;
        conn.execute("DELETE FROM commitments WHERE id = ?1", params![commitment_id])
            .map_err(InfraError::from)?;
        debug!(commitment_id, "deleted commitment record");
        Ok(())
    }

    /// All commitments owned by a profile, newest first.
    #[instrument(skip(self))]
    pub fn list_by_profile(&self, profile_id: &str) -> Result<Vec<Commitment>> {
        let conn = self.db.get()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COMMITMENT_COLUMNS} FROM commitments
                 WHERE profile_id = ?1 ORDER BY created_at DESC"
            ))
            .map_err(InfraError::from)?;

        let rows = stmt
            .query_map(params![profile_id], map_commitment_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        Ok(rows)
    }
}

#[async_trait]
impl CommitmentStore for SqliteCommitmentRepository {
    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Commitment>> {
        let conn = self.db.get()?;

        let row = conn
            .query_row(
                &format!("SELECT {COMMITMENT_COLUMNS} FROM commitments WHERE id = ?1"),
                params![id],
                map_commitment_row,
            )
            .optional()
            .map_err(InfraError::from)?;

        Ok(row)
    }

    #[instrument(skip(self))]
    async fn set_external_id(
        &self,
        commitment_id: &str,
        link: ExternalLink,
        external_id: &str,
    ) -> Result<()> {
        let conn = self.db.get()?;

        conn.execute(
            &format!(
                "UPDATE commitments SET {} = ?2, updated_at = ?3 WHERE id = ?1",
                link.column()
            ),
            params![commitment_id, external_id, Utc::now().timestamp()],
        )
        .map_err(InfraError::from)?;

        debug!(commitment_id, column = link.column(), external_id, "stored external link");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_external_id(&self, commitment_id: &str, link: ExternalLink) -> Result<()> {
        let conn = self.db.get()?;

        conn.execute(
            &format!(
                "UPDATE commitments SET {} = NULL, updated_at = ?2 WHERE id = ?1",
                link.column()
            ),
            params![commitment_id, Utc::now().timestamp()],
        )
        .map_err(InfraError::from)?;

        debug!(commitment_id, column = link.column(), "cleared external link");

        Ok(())
    }
}

fn map_commitment_row(row: &Row<'_>) -> rusqlite::Result<Commitment> {
    let deadline: Option<i64> = row.get(4)?;
    let status: String = row.get(5)?;
    let task_type: String = row.get(6)?;
    let priority: String = row.get(7)?;

    Ok(Commitment {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        description: row.get(2)?,
        assignee: row.get(3)?,
        deadline: deadline.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        status: CommitmentStatus::parse(&status)
            .ok_or_else(|| invalid_column(5, &status))?,
        task_type: TaskType::parse(&task_type)
            .ok_or_else(|| invalid_column(6, &task_type))?,
        priority: Priority::parse(&priority)
            .ok_or_else(|| invalid_column(7, &priority))?,
        calendar_event_id: row.get(8)?,
        jira_task_id: row.get(9)?,
        microsoft_task_id: row.get(10)?,
        completion_note: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn invalid_column(index: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        Box::new(CadenceError::InvalidInput(format!("unrecognised value: {value}"))),
    )
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn setup() -> (SqliteCommitmentRepository, TempDir) {
        let temp = TempDir::new().unwrap();
        let db = Database::open(temp.path().join("test.db"), 2).unwrap();
        let conn = db.get().unwrap();
        conn.execute(
            "INSERT INTO profiles (id, name, preferences, created_at) VALUES ('p1', 'Test', '{}', 0)",
            params![],
        )
        .unwrap();
        (SqliteCommitmentRepository::new(db), temp)
    }

    fn commitment(id: &str) -> Commitment {
        Commitment {
            id: id.into(),
            profile_id: "p1".into(),
            description: "Send the revised proposal".into(),
            assignee: Some("dana".into()),
            deadline: Some(Utc::now()),
            status: CommitmentStatus::Pending,
            task_type: TaskType::Commitment,
            priority: Priority::Normal,
            calendar_event_id: None,
            jira_task_id: None,
            microsoft_task_id: None,
            completion_note: None,
            created_at: Utc::now().timestamp(),
            updated_at: Utc::now().timestamp(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let (repo, _temp) = setup();
        repo.insert(&commitment("c1")).unwrap();

        let found = repo.get("c1").await.unwrap().unwrap();
        assert_eq!(found.description, "Send the revised proposal");
        assert_eq!(found.task_type, TaskType::Commitment);
        assert_eq!(found.status, CommitmentStatus::Pending);
        assert!(found.deadline.is_some());
    }

    #[tokio::test]
    async fn set_and_clear_external_ids_are_field_level() {
        let (repo, _temp) = setup();
        repo.insert(&commitment("c1")).unwrap();

        repo.set_external_id("c1", ExternalLink::CalendarEvent, "evt-1").await.unwrap();
        repo.set_external_id("c1", ExternalLink::JiraIssue, "JIRA-1").await.unwrap();

        let row = repo.get("c1").await.unwrap().unwrap();
        assert_eq!(row.calendar_event_id.as_deref(), Some("evt-1"));
        assert_eq!(row.jira_task_id.as_deref(), Some("JIRA-1"));
        assert_eq!(row.microsoft_task_id, None);

        // Clearing one link leaves the others untouched.
        repo.clear_external_id("c1", ExternalLink::CalendarEvent).await.unwrap();
        let row = repo.get("c1").await.unwrap().unwrap();
        assert_eq!(row.calendar_event_id, None);
        assert_eq!(row.jira_task_id.as_deref(), Some("JIRA-1"));
    }

    #[tokio::test]
    async fn update_status_records_completion_note() {
        let (repo, _temp) = setup();
        repo.insert(&commitment("c1")).unwrap();

        repo.update_status("c1", CommitmentStatus::Completed, Some("done in standup")).unwrap();

        let row = repo.get("c1").await.unwrap().unwrap();
        assert_eq!(row.status, CommitmentStatus::Completed);
        assert_eq!(row.completion_note.as_deref(), Some("done in standup"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (repo, _temp) = setup();
        repo.insert(&commitment("c1")).unwrap();

        repo.delete("c1").unwrap();
        repo.delete("c1").unwrap();

        assert!(repo.get("c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_by_profile_returns_owned_rows() {
        let (repo, _temp) = setup();
        repo.insert(&commitment("c1")).unwrap();
        repo.insert(&commitment("c2")).unwrap();

        let rows = repo.list_by_profile("p1").unwrap();
        assert_eq!(rows.len(), 2);
    }
}
