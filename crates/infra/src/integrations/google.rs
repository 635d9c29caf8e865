//! Google Calendar provider adapter

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cadence_core::{SyncPolicy, TaskAdapter, TaskDescriber, TokenLifecycleManager};
use cadence_domain::{
    Commitment, IntegrationFamily, Provider, Result, SyncFailure, SyncResult,
};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{error_text, failure_from_status, resource_body, PROVIDER_TIMEOUT_SECS};
use crate::http::HttpClient;

const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar adapter
///
/// Creates one-hour events on the primary calendar at the policy's
/// scheduled window; deletion is idempotent (404/410 read as already gone).
pub struct GoogleCalendarAdapter {
    api_base: String,
    http: HttpClient,
    tokens: Arc<TokenLifecycleManager>,
    describer: Arc<dyn TaskDescriber>,
    policy: SyncPolicy,
}

impl GoogleCalendarAdapter {
    /// Create a new adapter against the public Google Calendar API.
    ///
    /// Mutating calls are sent exactly once; retrying a create could
    /// duplicate the event server-side.
    pub fn new(
        tokens: Arc<TokenLifecycleManager>,
        describer: Arc<dyn TaskDescriber>,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .max_attempts(1)
            .build()?;

        Ok(Self {
            api_base: GOOGLE_CALENDAR_API_BASE.to_string(),
            http,
            tokens,
            describer,
            policy: SyncPolicy::default(),
        })
    }

    /// Override the API base URL (tests).
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Override the scheduling policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn access_token(&self, profile_id: &str) -> SyncResult<String> {
        self.tokens
            .get_valid_token(profile_id, IntegrationFamily::Calendar, Provider::Google)
            .await
    }
}

#[async_trait]
impl TaskAdapter for GoogleCalendarAdapter {
    async fn create(&self, commitment: &Commitment) -> SyncResult<String> {
        let deadline = commitment
            .deadline
            .ok_or_else(|| SyncFailure::Rejected("commitment has no deadline".to_string()))?;

        let token = self.access_token(&commitment.profile_id).await?;
        let (start, end) = self.policy.scheduled_window(deadline, commitment.priority);
        let body = resource_body(&self.describer, commitment).await;

        let request = GoogleEventRequest {
            summary: commitment.description.clone(),
            description: body,
            start: GoogleEventTime { date_time: start.to_rfc3339(), time_zone: "UTC" },
            end: GoogleEventTime { date_time: end.to_rfc3339(), time_zone: "UTC" },
        };

        let url = format!("{}/calendars/primary/events", self.api_base);
        let response = self
            .http
            .send(self.http.request(Method::POST, &url).bearer_auth(&token).json(&request))
            .await
            .map_err(SyncFailure::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure_from_status("Google Calendar", status, &error_text(response).await));
        }

        let event: GoogleEventResponse = response
            .json()
            .await
            .map_err(|e| SyncFailure::Rejected(format!("failed to parse event response: {e}")))?;

        debug!(commitment_id = %commitment.id, event_id = %event.id, "created calendar event");

        Ok(event.id)
    }

    async fn complete(
        &self,
        _profile_id: &str,
        external_id: &str,
        _note: Option<&str>,
    ) -> SyncResult<()> {
        // Calendar events carry no completion state; the orchestrator frees
        // still-upcoming events by deleting them instead.
        debug!(external_id, "calendar events have no completion state");
        Ok(())
    }

    async fn delete(&self, profile_id: &str, external_id: &str) -> SyncResult<()> {
        let token = self.access_token(profile_id).await?;

        let url = format!("{}/calendars/primary/events/{}", self.api_base, external_id);
        let response = self
            .http
            .send(self.http.request(Method::DELETE, &url).bearer_auth(&token))
            .await
            .map_err(SyncFailure::from)?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            if !status.is_success() {
                debug!(external_id, "calendar event already gone");
            }
            return Ok(());
        }

        Err(failure_from_status("Google Calendar", status, &error_text(response).await))
    }

    async fn is_connected(&self, profile_id: &str) -> bool {
        self.tokens
            .is_connected(profile_id, IntegrationFamily::Calendar, Provider::Google)
            .await
    }
}

#[derive(Debug, Serialize)]
struct GoogleEventRequest {
    summary: String,
    description: String,
    start: GoogleEventTime,
    end: GoogleEventTime,
}

#[derive(Debug, Serialize)]
struct GoogleEventTime {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(rename = "timeZone")]
    time_zone: &'static str,
}

#[derive(Debug, Deserialize)]
struct GoogleEventResponse {
    id: String,
}
