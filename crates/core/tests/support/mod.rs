//! Shared test helpers for `cadence-core` integration tests.
//!
//! Provides counting mock adapters, an in-memory commitment store, and
//! commitment fixtures so scenario tests can focus on behaviour instead of
//! boilerplate.

pub mod adapters;
pub mod store;

use cadence_domain::{Commitment, CommitmentStatus, Priority, TaskType};
use chrono::{DateTime, Duration, Utc};

pub use adapters::MockAdapter;
pub use store::InMemoryCommitmentStore;

/// A deadline comfortably in the future (tomorrow, 10:00-ish).
pub fn tomorrow() -> DateTime<Utc> {
    Utc::now() + Duration::hours(26)
}

/// A deadline already behind us.
pub fn yesterday() -> DateTime<Utc> {
    Utc::now() - Duration::hours(26)
}

/// Baseline pending commitment owned by profile `p1`.
pub fn commitment(task_type: TaskType, deadline: Option<DateTime<Utc>>) -> Commitment {
    Commitment {
        id: "c1".to_string(),
        profile_id: "p1".to_string(),
        description: "Send the revised proposal".to_string(),
        assignee: Some("dana".to_string()),
        deadline,
        status: CommitmentStatus::Pending,
        task_type,
        priority: Priority::Normal,
        calendar_event_id: None,
        jira_task_id: None,
        microsoft_task_id: None,
        completion_note: None,
        created_at: Utc::now().timestamp(),
        updated_at: Utc::now().timestamp(),
    }
}
