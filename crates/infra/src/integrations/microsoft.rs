//! Microsoft Graph provider adapter (calendar and To Do)
//!
//! One struct serves both integration families: `::calendar()` writes
//! events, `::tasks()` writes To Do tasks. Both ride the same credential
//! row (the token manager normalizes Microsoft lookups to the shared
//! storage family), with different API scopes on the shared token.

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

const MICROSOFT_GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";
const GRAPH_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Microsoft Graph adapter for one integration family.
pub struct MicrosoftGraphAdapter {
    api_base: String,
    http: HttpClient,
    tokens: Arc<TokenLifecycleManager>,
    describer: Arc<dyn TaskDescriber>,
    policy: SyncPolicy,
    family: IntegrationFamily,
    todo_list_id: String,
}

impl MicrosoftGraphAdapter {
    /// Calendar-family adapter: one-hour events at the scheduled window.
    pub fn calendar(
        tokens: Arc<TokenLifecycleManager>,
        describer: Arc<dyn TaskDescriber>,
    ) -> Result<Self> {
        Self::build(tokens, describer, IntegrationFamily::Calendar, String::new())
    }

    /// Task-family adapter: To Do tasks with a due timestamp, no duration.
    pub fn tasks(
        tokens: Arc<TokenLifecycleManager>,
        describer: Arc<dyn TaskDescriber>,
        todo_list_id: impl Into<String>,
    ) -> Result<Self> {
        Self::build(tokens, describer, IntegrationFamily::Task, todo_list_id.into())
    }

    fn build(
        tokens: Arc<TokenLifecycleManager>,
        describer: Arc<dyn TaskDescriber>,
        family: IntegrationFamily,
        todo_list_id: String,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .max_attempts(1)
            .build()?;

        Ok(Self {
            api_base: MICROSOFT_GRAPH_API_BASE.to_string(),
            http,
            tokens,
            describer,
            policy: SyncPolicy::default(),
            family,
            todo_list_id,
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
        self.tokens.get_valid_token(profile_id, self.family, Provider::Microsoft).await
    }

    fn task_url(&self, task_id: Option<&str>) -> String {
        match task_id {
            Some(id) => {
                format!("{}/me/todo/lists/{}/tasks/{}", self.api_base, self.todo_list_id, id)
            }
            None => format!("{}/me/todo/lists/{}/tasks", self.api_base, self.todo_list_id),
        }
    }

    async fn create_event(&self, token: &str, commitment: &Commitment) -> SyncResult<String> {
        let deadline = commitment
            .deadline
            .ok_or_else(|| SyncFailure::Rejected("commitment has no deadline".to_string()))?;
        let (start, end) = self.policy.scheduled_window(deadline, commitment.priority);
        let body = resource_body(&self.describer, commitment).await;

        let request = GraphEventRequest {
            subject: commitment.description.clone(),
            body: GraphItemBody { content_type: "text", content: body },
            start: GraphDateTime {
                date_time: start.format(GRAPH_DATETIME_FORMAT).to_string(),
                time_zone: "UTC",
            },
            end: GraphDateTime {
                date_time: end.format(GRAPH_DATETIME_FORMAT).to_string(),
                time_zone: "UTC",
            },
        };

        let url = format!("{}/me/events", self.api_base);
        let response = self
            .http
            .send(self.http.request(Method::POST, &url).bearer_auth(token).json(&request))
            .await
            .map_err(SyncFailure::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure_from_status("Microsoft Graph", status, &error_text(response).await));
        }

        let created: GraphIdResponse = response
            .json()
            .await
            .map_err(|e| SyncFailure::Rejected(format!("failed to parse event response: {e}")))?;

        debug!(commitment_id = %commitment.id, event_id = %created.id, "created Graph event");

        Ok(created.id)
    }

    async fn create_task(&self, token: &str, commitment: &Commitment) -> SyncResult<String> {
        let deadline = commitment
            .deadline
            .ok_or_else(|| SyncFailure::Rejected("commitment has no deadline".to_string()))?;
        let body = resource_body(&self.describer, commitment).await;

        // Task-family mapping: the deadline is a due timestamp, no window.
        let request = GraphTaskRequest {
            title: commitment.description.clone(),
            body: GraphItemBody { content_type: "text", content: body },
            due_date_time: GraphDateTime {
                date_time: deadline.format(GRAPH_DATETIME_FORMAT).to_string(),
                time_zone: "UTC",
            },
        };

        let response = self
            .http
            .send(
                self.http
                    .request(Method::POST, self.task_url(None))
                    .bearer_auth(token)
                    .json(&request),
            )
            .await
            .map_err(SyncFailure::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure_from_status("Microsoft Graph", status, &error_text(response).await));
        }

        let created: GraphIdResponse = response
            .json()
            .await
            .map_err(|e| SyncFailure::Rejected(format!("failed to parse task response: {e}")))?;

        debug!(commitment_id = %commitment.id, task_id = %created.id, "created To Do task");

        Ok(created.id)
    }
}

#[async_trait]
impl TaskAdapter for MicrosoftGraphAdapter {
    async fn create(&self, commitment: &Commitment) -> SyncResult<String> {
        let token = self.access_token(&commitment.profile_id).await?;

        match self.family {
            IntegrationFamily::Calendar => self.create_event(&token, commitment).await,
            IntegrationFamily::Task => self.create_task(&token, commitment).await,
        }
    }

    async fn complete(
        &self,
        profile_id: &str,
        external_id: &str,
        _note: Option<&str>,
    ) -> SyncResult<()> {
        if self.family == IntegrationFamily::Calendar {
            debug!(external_id, "calendar events have no completion state");
            return Ok(());
        }

        let token = self.access_token(profile_id).await?;

        let response = self
            .http
            .send(
                self.http
                    .request(Method::PATCH, self.task_url(Some(external_id)))
                    .bearer_auth(&token)
                    .json(&serde_json::json!({ "status": "completed" })),
            )
            .await
            .map_err(SyncFailure::from)?;

        let status = response.status();
        if status.is_success() {
            debug!(external_id, "marked To Do task completed");
            return Ok(());
        }

        Err(failure_from_status("Microsoft Graph", status, &error_text(response).await))
    }

    async fn delete(&self, profile_id: &str, external_id: &str) -> SyncResult<()> {
        let token = self.access_token(profile_id).await?;

        let url = match self.family {
            IntegrationFamily::Calendar => {
                format!("{}/me/events/{}", self.api_base, external_id)
            }
            IntegrationFamily::Task => self.task_url(Some(external_id)),
        };

        let response = self
            .http
            .send(self.http.request(Method::DELETE, &url).bearer_auth(&token))
            .await
            .map_err(SyncFailure::from)?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            if !status.is_success() {
                debug!(external_id, "Graph resource already gone");
            }
            return Ok(());
        }

        Err(failure_from_status("Microsoft Graph", status, &error_text(response).await))
    }

    async fn is_connected(&self, profile_id: &str) -> bool {
        self.tokens.is_connected(profile_id, self.family, Provider::Microsoft).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphEventRequest {
    subject: String,
    body: GraphItemBody,
    start: GraphDateTime,
    end: GraphDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphTaskRequest {
    title: String,
    body: GraphItemBody,
    due_date_time: GraphDateTime,
}

#[derive(Debug, Serialize)]
struct GraphItemBody {
    #[serde(rename = "contentType")]
    content_type: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct GraphDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(rename = "timeZone")]
    time_zone: &'static str,
}

#[derive(Debug, Deserialize)]
struct GraphIdResponse {
    id: String,
}
