//! Port interfaces for sync operations

use async_trait::async_trait;
use cadence_domain::{Commitment, ExternalLink, Result, SyncResult};

/// Uniform capability surface over one external resource family
///
/// One instance exists per provider. Implementations map the commitment
/// onto the provider's schema; the orchestrator owns eligibility, routing,
/// and the link registry. Every operation receives the owning profile
/// explicitly so the credential handle is never ambient state.
#[async_trait]
pub trait TaskAdapter: Send + Sync {
    /// Create the external resource for a commitment.
    ///
    /// Returns the provider-assigned external id.
    async fn create(&self, commitment: &Commitment) -> SyncResult<String>;

    /// Mark the external resource done.
    ///
    /// Providers that support comments append the completion note as a
    /// comment, never overwriting the description. A missing resource
    /// surfaces as `SyncFailure::NotFound`, which callers treat as success.
    async fn complete(
        &self,
        profile_id: &str,
        external_id: &str,
        note: Option<&str>,
    ) -> SyncResult<()>;

    /// Delete the external resource.
    ///
    /// Deletion is idempotent from the caller's perspective: a not-found
    /// response is success.
    async fn delete(&self, profile_id: &str, external_id: &str) -> SyncResult<()>;

    /// Whether a usable credential exists for the profile. Never fails.
    async fn is_connected(&self, profile_id: &str) -> bool;
}

/// Trait for the link registry on the commitment record
///
/// The nullable external-id columns are the sole duplicate-prevention
/// mechanism; writes are field-level so concurrent passes never clobber
/// unrelated links.
#[async_trait]
pub trait CommitmentStore: Send + Sync {
    /// Load a commitment by id.
    async fn get(&self, id: &str) -> Result<Option<Commitment>>;

    /// Store an external id into one link slot.
    async fn set_external_id(
        &self,
        commitment_id: &str,
        link: ExternalLink,
        external_id: &str,
    ) -> Result<()>;

    /// Clear one link slot.
    async fn clear_external_id(&self, commitment_id: &str, link: ExternalLink) -> Result<()>;
}

/// Trait for the descriptive-body collaborator
///
/// Text generation lives outside this engine and may fail; adapters fall
/// back to [`fallback_description`] when it does.
#[async_trait]
pub trait TaskDescriber: Send + Sync {
    /// Produce the descriptive body for an external resource.
    async fn describe(&self, commitment: &Commitment) -> Result<String>;
}

/// Plain concatenation of the commitment's own fields.
///
/// Used whenever the describer collaborator is unavailable or fails.
#[must_use]
pub fn fallback_description(commitment: &Commitment) -> String {
    let mut lines = vec![commitment.description.clone()];

    if let Some(assignee) = &commitment.assignee {
        lines.push(format!("Assignee: {assignee}"));
    }
    if let Some(deadline) = commitment.deadline {
        lines.push(format!("Due: {}", deadline.format("%Y-%m-%d %H:%M UTC")));
    }
    lines.push(format!("Type: {}", commitment.task_type.as_str()));
    lines.push(format!("Priority: {}", commitment.priority.as_str()));

    lines.join("\n")
}

/// Describer that always succeeds with the plain field concatenation.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainDescriber;

#[async_trait]
impl TaskDescriber for PlainDescriber {
    async fn describe(&self, commitment: &Commitment) -> Result<String> {
        Ok(fallback_description(commitment))
    }
}

#[cfg(test)]
mod tests {
    use cadence_domain::{CommitmentStatus, Priority, TaskType};
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn fallback_concatenates_populated_fields() {
        let commitment = Commitment {
            id: "c1".into(),
            profile_id: "p1".into(),
            description: "Send the revised proposal".into(),
            assignee: Some("dana".into()),
            deadline: Some(Utc.with_ymd_and_hms(2025, 11, 4, 10, 0, 0).unwrap()),
            status: CommitmentStatus::Pending,
            task_type: TaskType::Commitment,
            priority: Priority::High,
            calendar_event_id: None,
            jira_task_id: None,
            microsoft_task_id: None,
            completion_note: None,
            created_at: 0,
            updated_at: 0,
        };

        let text = fallback_description(&commitment);
        assert!(text.starts_with("Send the revised proposal"));
        assert!(text.contains("Assignee: dana"));
        assert!(text.contains("Due: 2025-11-04 10:00 UTC"));
        assert!(text.contains("Priority: high"));
    }

    #[test]
    fn fallback_omits_absent_fields() {
        let commitment = Commitment {
            id: "c1".into(),
            profile_id: "p1".into(),
            description: "Circulate notes".into(),
            assignee: None,
            deadline: None,
            status: CommitmentStatus::Pending,
            task_type: TaskType::Action,
            priority: Priority::Normal,
            calendar_event_id: None,
            jira_task_id: None,
            microsoft_task_id: None,
            completion_note: None,
            created_at: 0,
            updated_at: 0,
        };

        let text = fallback_description(&commitment);
        assert!(!text.contains("Assignee:"));
        assert!(!text.contains("Due:"));
    }
}
