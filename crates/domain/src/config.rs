//! Configuration management

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub integrations: IntegrationsConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Sync engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Bound on each outbound provider call, in seconds.
    pub provider_timeout_secs: u64,
    /// Refresh tokens this many seconds before their recorded expiry.
    pub refresh_threshold_secs: i64,
    pub enabled: bool,
}

/// Per-provider integration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    pub google: OAuthAppConfig,
    pub microsoft: MicrosoftConfig,
    pub jira: JiraConfig,
}

/// OAuth application registration for a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthAppConfig {
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    /// Token endpoint override; `None` uses the provider default.
    #[serde(default)]
    pub token_endpoint: Option<String>,
}

/// Microsoft Graph configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicrosoftConfig {
    #[serde(flatten)]
    pub oauth: OAuthAppConfig,
    /// Target To Do list for task sync.
    pub todo_list_id: String,
}

/// Jira site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    #[serde(flatten)]
    pub oauth: OAuthAppConfig,
    /// Site API base, e.g. `https://example.atlassian.net`.
    pub base_url: String,
    /// Project issues are created under.
    pub project_key: String,
    /// Transition id used to mark issues done; `None` discovers one whose
    /// target status category is "done".
    #[serde(default)]
    pub done_transition_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig { path: "cadence.db".to_string(), pool_size: 8 },
            sync: SyncConfig {
                provider_timeout_secs: 5,
                refresh_threshold_secs: 60,
                enabled: true,
            },
            integrations: IntegrationsConfig {
                google: OAuthAppConfig {
                    client_id: String::new(),
                    client_secret: None,
                    token_endpoint: None,
                },
                microsoft: MicrosoftConfig {
                    oauth: OAuthAppConfig {
                        client_id: String::new(),
                        client_secret: None,
                        token_endpoint: None,
                    },
                    todo_list_id: String::new(),
                },
                jira: JiraConfig {
                    oauth: OAuthAppConfig {
                        client_id: String::new(),
                        client_secret: None,
                        token_endpoint: None,
                    },
                    base_url: String::new(),
                    project_key: String::new(),
                    done_transition_id: None,
                },
            },
        }
    }
}
