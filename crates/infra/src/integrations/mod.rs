//! Provider adapter implementations
//!
//! One adapter per provider, all speaking the `TaskAdapter` contract:
//! Google Calendar, Microsoft Graph (calendar and To Do from one struct),
//! and Jira.

pub mod google;
pub mod jira;
pub mod microsoft;

use std::sync::Arc;

use cadence_core::{fallback_description, TaskDescriber};
use cadence_domain::{Commitment, SyncFailure};
use reqwest::StatusCode;
use tracing::warn;

pub use google::GoogleCalendarAdapter;
pub use jira::JiraAdapter;
pub use microsoft::MicrosoftGraphAdapter;

/// Bound on each outbound provider call.
pub(crate) const PROVIDER_TIMEOUT_SECS: u64 = 5;

/// Map a non-success provider response onto the sync failure taxonomy.
///
/// 404 reads as a missing resource, other 4xx as validation rejections,
/// everything else as a transient outage.
pub(crate) fn failure_from_status(
    provider: &str,
    status: StatusCode,
    body: &str,
) -> SyncFailure {
    if status == StatusCode::NOT_FOUND {
        SyncFailure::NotFound
    } else if status.is_client_error() {
        SyncFailure::Rejected(format!("{provider} ({status}): {body}"))
    } else {
        SyncFailure::Unavailable(format!("{provider} ({status}): {body}"))
    }
}

/// Read a response body for error reporting, tolerating read failures.
pub(crate) async fn error_text(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_else(|_| "Unknown error".to_string())
}

/// Produce the descriptive body for an external resource.
///
/// The describer collaborator may fail; its failure falls back to a plain
/// concatenation of the commitment's own fields.
pub(crate) async fn resource_body(
    describer: &Arc<dyn TaskDescriber>,
    commitment: &Commitment,
) -> String {
    match describer.describe(commitment).await {
        Ok(body) => body,
        Err(e) => {
            warn!(
                commitment_id = %commitment.id,
                error = %e,
                "describer failed; falling back to field concatenation"
            );
            fallback_description(commitment)
        }
    }
}
