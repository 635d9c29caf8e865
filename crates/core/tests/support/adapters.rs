//! Counting mock adapters for orchestrator tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use cadence_core::TaskAdapter;
use cadence_domain::{Commitment, SyncFailure, SyncResult};

/// Configurable mock provider adapter that counts every call.
pub struct MockAdapter {
    connected: bool,
    create_response: SyncResult<String>,
    complete_response: SyncResult<()>,
    delete_response: SyncResult<()>,
    pub create_calls: AtomicUsize,
    pub complete_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub last_note: Mutex<Option<String>>,
}

impl MockAdapter {
    /// A connected adapter whose calls all succeed.
    pub fn connected(external_id: &str) -> Self {
        Self {
            connected: true,
            create_response: Ok(external_id.to_string()),
            complete_response: Ok(()),
            delete_response: Ok(()),
            create_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            last_note: Mutex::new(None),
        }
    }

    /// An adapter with no usable credential.
    pub fn disconnected() -> Self {
        let mut adapter = Self::connected("unused");
        adapter.connected = false;
        adapter
    }

    pub fn with_create_failure(mut self, failure: SyncFailure) -> Self {
        self.create_response = Err(failure);
        self
    }

    pub fn with_complete_failure(mut self, failure: SyncFailure) -> Self {
        self.complete_response = Err(failure);
        self
    }

    pub fn with_delete_failure(mut self, failure: SyncFailure) -> Self {
        self.delete_response = Err(failure);
        self
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn complete_count(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskAdapter for MockAdapter {
    async fn create(&self, _commitment: &Commitment) -> SyncResult<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.create_response.clone()
    }

    async fn complete(
        &self,
        _profile_id: &str,
        _external_id: &str,
        note: Option<&str>,
    ) -> SyncResult<()> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_note.lock().unwrap() = note.map(String::from);
        self.complete_response.clone()
    }

    async fn delete(&self, _profile_id: &str, _external_id: &str) -> SyncResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.delete_response.clone()
    }

    async fn is_connected(&self, _profile_id: &str) -> bool {
        self.connected
    }
}
