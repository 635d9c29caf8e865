//! Jira provider adapter
//!
//! Issue create carries the assignee resolution policy: if the create is
//! rejected over the assignee, it is retried once without one, followed by
//! a best-effort assignment call whose failure is logged only. Many
//! tracker configurations legitimately forbid assigning non-members.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cadence_core::{TaskAdapter, TaskDescriber, TokenLifecycleManager};
use cadence_domain::{
    Commitment, IntegrationFamily, JiraConfig, Provider, Result, SyncFailure, SyncResult,
};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{error_text, failure_from_status, resource_body, PROVIDER_TIMEOUT_SECS};
use crate::http::HttpClient;

const ISSUE_TYPE: &str = "Task";

/// Jira issue-tracker adapter
pub struct JiraAdapter {
    http: HttpClient,
    tokens: Arc<TokenLifecycleManager>,
    describer: Arc<dyn TaskDescriber>,
    config: JiraConfig,
}

impl JiraAdapter {
    /// Create a new adapter against the configured Jira site.
    pub fn new(
        tokens: Arc<TokenLifecycleManager>,
        describer: Arc<dyn TaskDescriber>,
        config: JiraConfig,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .max_attempts(1)
            .build()?;

        Ok(Self { http, tokens, describer, config })
    }

    async fn access_token(&self, profile_id: &str) -> SyncResult<String> {
        self.tokens.get_valid_token(profile_id, IntegrationFamily::Task, Provider::Jira).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Best-effort account lookup for the assignee name.
    ///
    /// Any failure resolves to `None`: an unresolved assignee is not a
    /// reason to withhold the issue.
    async fn resolve_account_id(&self, token: &str, assignee: &str) -> Option<String> {
        let url = self.url("/rest/api/3/user/search");
        let request = self
            .http
            .request(Method::GET, &url)
            .bearer_auth(token)
            .query(&[("query", assignee)]);

        let response = match self.http.send(request).await {
            Ok(response) => response,
            Err(e) => {
                debug!(assignee, error = %e, "assignee lookup failed");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(assignee, status = %response.status(), "assignee lookup rejected");
            return None;
        }

        match response.json::<Vec<JiraUser>>().await {
            Ok(users) => users.into_iter().next().map(|user| user.account_id),
            Err(e) => {
                debug!(assignee, error = %e, "failed to parse assignee lookup");
                None
            }
        }
    }

    async fn post_issue(
        &self,
        token: &str,
        commitment: &Commitment,
        account_id: Option<&str>,
        body: &str,
    ) -> SyncResult<String> {
        let mut fields = json!({
            "project": { "key": self.config.project_key },
            "summary": commitment.description,
            "issuetype": { "name": ISSUE_TYPE },
            "description": adf_paragraph(body),
        });

        if let Some(deadline) = commitment.deadline {
            fields["duedate"] = Value::String(deadline.format("%Y-%m-%d").to_string());
        }
        if let Some(account_id) = account_id {
            fields["assignee"] = json!({ "accountId": account_id });
        }

        let url = self.url("/rest/api/3/issue");
        let response = self
            .http
            .send(
                self.http
                    .request(Method::POST, &url)
                    .bearer_auth(token)
                    .json(&json!({ "fields": fields })),
            )
            .await
            .map_err(SyncFailure::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure_from_status("Jira", status, &error_text(response).await));
        }

        let created: JiraIssueResponse = response
            .json()
            .await
            .map_err(|e| SyncFailure::Rejected(format!("failed to parse issue response: {e}")))?;

        Ok(created.key)
    }

    /// Best-effort post-create assignment; failure is logged, not surfaced.
    async fn assign_issue(&self, token: &str, issue_key: &str, account_id: &str) {
        let url = self.url(&format!("/rest/api/3/issue/{issue_key}/assignee"));
        let request = self
            .http
            .request(Method::PUT, &url)
            .bearer_auth(token)
            .json(&json!({ "accountId": account_id }));

        match self.http.send(request).await {
            Ok(response) if response.status().is_success() => {
                debug!(issue_key, "assigned issue after creation");
            }
            Ok(response) => {
                warn!(issue_key, status = %response.status(), "post-create assignment rejected");
            }
            Err(e) => {
                warn!(issue_key, error = %e, "post-create assignment failed");
            }
        }
    }

    /// Transition id used to mark an issue done.
    ///
    /// Configured explicitly, or discovered from the issue's available
    /// transitions by target status category.
    async fn done_transition_id(&self, token: &str, issue_key: &str) -> SyncResult<String> {
        if let Some(id) = &self.config.done_transition_id {
            return Ok(id.clone());
        }

        let url = self.url(&format!("/rest/api/3/issue/{issue_key}/transitions"));
        let response = self
            .http
            .send(self.http.request(Method::GET, &url).bearer_auth(token))
            .await
            .map_err(SyncFailure::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure_from_status("Jira", status, &error_text(response).await));
        }

        let transitions: JiraTransitionsResponse = response.json().await.map_err(|e| {
            SyncFailure::Rejected(format!("failed to parse transitions response: {e}"))
        })?;

        transitions
            .transitions
            .into_iter()
            .find(|t| t.to.status_category.key == "done")
            .map(|t| t.id)
            .ok_or_else(|| {
                SyncFailure::Rejected(format!("issue {issue_key} has no transition to done"))
            })
    }

    async fn add_comment(&self, token: &str, issue_key: &str, note: &str) {
        let url = self.url(&format!("/rest/api/3/issue/{issue_key}/comment"));
        let request = self
            .http
            .request(Method::POST, &url)
            .bearer_auth(token)
            .json(&json!({ "body": adf_paragraph(note) }));

        // The note rides as a comment so the description is never
        // overwritten; a failed comment does not undo the completion.
        match self.http.send(request).await {
            Ok(response) if response.status().is_success() => {
                debug!(issue_key, "appended completion note");
            }
            Ok(response) => {
                warn!(issue_key, status = %response.status(), "completion note rejected");
            }
            Err(e) => {
                warn!(issue_key, error = %e, "failed to append completion note");
            }
        }
    }
}

#[async_trait]
impl TaskAdapter for JiraAdapter {
    async fn create(&self, commitment: &Commitment) -> SyncResult<String> {
        let token = self.access_token(&commitment.profile_id).await?;
        let body = resource_body(&self.describer, commitment).await;

        let account_id = match &commitment.assignee {
            Some(assignee) => self.resolve_account_id(&token, assignee).await,
            None => None,
        };

        match self.post_issue(&token, commitment, account_id.as_deref(), &body).await {
            Ok(key) => {
                debug!(commitment_id = %commitment.id, issue_key = %key, "created issue");
                Ok(key)
            }
            Err(SyncFailure::Rejected(detail))
                if account_id.is_some() && mentions_assignee(&detail) =>
            {
                warn!(
                    commitment_id = %commitment.id,
                    detail,
                    "issue rejected over assignee; retrying without"
                );

                let key = self.post_issue(&token, commitment, None, &body).await?;

                if let Some(account_id) = account_id {
                    self.assign_issue(&token, &key, &account_id).await;
                }

                Ok(key)
            }
            Err(other) => Err(other),
        }
    }

    async fn complete(
        &self,
        profile_id: &str,
        external_id: &str,
        note: Option<&str>,
    ) -> SyncResult<()> {
        let token = self.access_token(profile_id).await?;

        let transition_id = self.done_transition_id(&token, external_id).await?;

        let url = self.url(&format!("/rest/api/3/issue/{external_id}/transitions"));
        let response = self
            .http
            .send(
                self.http
                    .request(Method::POST, &url)
                    .bearer_auth(&token)
                    .json(&json!({ "transition": { "id": transition_id } })),
            )
            .await
            .map_err(SyncFailure::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure_from_status("Jira", status, &error_text(response).await));
        }

        debug!(issue_key = external_id, "transitioned issue to done");

        if let Some(note) = note {
            self.add_comment(&token, external_id, note).await;
        }

        Ok(())
    }

    async fn delete(&self, profile_id: &str, external_id: &str) -> SyncResult<()> {
        let token = self.access_token(profile_id).await?;

        let url = self.url(&format!("/rest/api/3/issue/{external_id}"));
        let response = self
            .http
            .send(self.http.request(Method::DELETE, &url).bearer_auth(&token))
            .await
            .map_err(SyncFailure::from)?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            if !status.is_success() {
                debug!(issue_key = external_id, "issue already gone");
            }
            return Ok(());
        }

        Err(failure_from_status("Jira", status, &error_text(response).await))
    }

    async fn is_connected(&self, profile_id: &str) -> bool {
        self.tokens.is_connected(profile_id, IntegrationFamily::Task, Provider::Jira).await
    }
}

fn mentions_assignee(detail: &str) -> bool {
    detail.to_ascii_lowercase().contains("assignee")
}

/// Minimal Atlassian document (ADF) wrapper around a paragraph of text.
fn adf_paragraph(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }]
        }]
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraUser {
    account_id: String,
}

#[derive(Debug, Deserialize)]
struct JiraIssueResponse {
    key: String,
}

#[derive(Debug, Deserialize)]
struct JiraTransitionsResponse {
    transitions: Vec<JiraTransition>,
}

#[derive(Debug, Deserialize)]
struct JiraTransition {
    id: String,
    to: JiraTransitionTarget,
}

#[derive(Debug, Deserialize)]
struct JiraTransitionTarget {
    #[serde(rename = "statusCategory")]
    status_category: JiraStatusCategory,
}

#[derive(Debug, Deserialize)]
struct JiraStatusCategory {
    key: String,
}
