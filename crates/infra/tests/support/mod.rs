//! Shared test helpers for `cadence-infra` integration tests.

use std::sync::Arc;

use cadence_core::{CredentialStore, PlainDescriber, TaskDescriber, TokenLifecycleManager};
use cadence_domain::{
    Commitment, CommitmentStatus, IntegrationCredential, IntegrationFamily, IntegrationsConfig,
    JiraConfig, MicrosoftConfig, OAuthAppConfig, Priority, Provider, TaskType, TokenSet,
};
use cadence_infra::auth::OAuthRefreshClient;
use cadence_infra::database::{Database, SqliteCredentialRepository};
use chrono::{Duration, Utc};
use rusqlite::params;
use tempfile::TempDir;

/// Integrations configuration pointed at nothing in particular; tests that
/// exercise refresh override the token endpoint.
pub fn integrations_config() -> IntegrationsConfig {
    IntegrationsConfig {
        google: OAuthAppConfig {
            client_id: "google-app".into(),
            client_secret: Some("shh".into()),
            token_endpoint: None,
        },
        microsoft: MicrosoftConfig {
            oauth: OAuthAppConfig {
                client_id: "microsoft-app".into(),
                client_secret: Some("shh".into()),
                token_endpoint: None,
            },
            todo_list_id: "list-1".into(),
        },
        jira: JiraConfig {
            oauth: OAuthAppConfig {
                client_id: "jira-app".into(),
                client_secret: Some("shh".into()),
                token_endpoint: None,
            },
            base_url: "https://example.atlassian.net".into(),
            project_key: "CAD".into(),
            done_transition_id: None,
        },
    }
}

/// A token manager over a real SQLite credential store holding one
/// unexpired credential for profile `p1`.
pub async fn token_manager_with_credential(
    family: IntegrationFamily,
    provider: Provider,
) -> (Arc<TokenLifecycleManager>, TempDir) {
    let temp = TempDir::new().unwrap();
    let db = Database::open(temp.path().join("test.db"), 2).unwrap();

    let conn = db.get().unwrap();
    conn.execute(
        "INSERT INTO profiles (id, name, preferences, created_at) VALUES ('p1', 'Test', '{}', 0)",
        params![],
    )
    .unwrap();
    drop(conn);

    let store = Arc::new(SqliteCredentialRepository::new(db));

    let credential = IntegrationCredential {
        profile_id: "p1".into(),
        family: provider.storage_family(family),
        provider,
        tokens: TokenSet {
            access_token: "test-token".into(),
            refresh_token: Some("test-refresh".into()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        },
        enabled: true,
        updated_at: Utc::now().timestamp(),
    };

    store.upsert(&credential).await.unwrap();

    let refresher = Arc::new(OAuthRefreshClient::new(integrations_config()).unwrap());
    let manager = Arc::new(TokenLifecycleManager::new(store, refresher));

    (manager, temp)
}

/// Default describer used by adapter tests.
pub fn describer() -> Arc<dyn TaskDescriber> {
    Arc::new(PlainDescriber)
}

/// Pending urgent commitment owned by profile `p1`.
pub fn urgent_commitment() -> Commitment {
    Commitment {
        id: "c1".into(),
        profile_id: "p1".into(),
        description: "Send the revised proposal".into(),
        assignee: Some("dana".into()),
        deadline: Some(Utc::now() + Duration::hours(26)),
        status: CommitmentStatus::Pending,
        task_type: TaskType::Commitment,
        priority: Priority::High,
        calendar_event_id: None,
        jira_task_id: None,
        microsoft_task_id: None,
        completion_note: None,
        created_at: Utc::now().timestamp(),
        updated_at: Utc::now().timestamp(),
    }
}
