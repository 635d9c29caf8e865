//! In-memory commitment store for orchestrator tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use cadence_core::CommitmentStore;
use cadence_domain::{Commitment, ExternalLink, Result};

/// Hash-map backed implementation of the link registry.
#[derive(Default)]
pub struct InMemoryCommitmentStore {
    rows: Mutex<HashMap<String, Commitment>>,
}

impl InMemoryCommitmentStore {
    pub fn with_commitment(commitment: Commitment) -> Self {
        let store = Self::default();
        store.rows.lock().unwrap().insert(commitment.id.clone(), commitment);
        store
    }

    pub fn insert(&self, commitment: Commitment) {
        self.rows.lock().unwrap().insert(commitment.id.clone(), commitment);
    }

    pub fn snapshot(&self, id: &str) -> Option<Commitment> {
        self.rows.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl CommitmentStore for InMemoryCommitmentStore {
    async fn get(&self, id: &str) -> Result<Option<Commitment>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn set_external_id(
        &self,
        commitment_id: &str,
        link: ExternalLink,
        external_id: &str,
    ) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.get_mut(commitment_id) {
            let value = Some(external_id.to_string());
            match link {
                ExternalLink::CalendarEvent => row.calendar_event_id = value,
                ExternalLink::MicrosoftTask => row.microsoft_task_id = value,
                ExternalLink::JiraIssue => row.jira_task_id = value,
            }
        }
        Ok(())
    }

    async fn clear_external_id(&self, commitment_id: &str, link: ExternalLink) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.get_mut(commitment_id) {
            match link {
                ExternalLink::CalendarEvent => row.calendar_event_id = None,
                ExternalLink::MicrosoftTask => row.microsoft_task_id = None,
                ExternalLink::JiraIssue => row.jira_task_id = None,
            }
        }
        Ok(())
    }
}
