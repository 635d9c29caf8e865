//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CADENCE_DB_PATH`: Database file path
//! - `CADENCE_DB_POOL_SIZE`: Connection pool size
//! - `CADENCE_PROVIDER_TIMEOUT`: Per-call provider timeout in seconds
//! - `CADENCE_REFRESH_THRESHOLD`: Token refresh threshold in seconds
//! - `CADENCE_SYNC_ENABLED`: Whether sync is enabled (true/false)
//! - `CADENCE_GOOGLE_CLIENT_ID` / `CADENCE_GOOGLE_CLIENT_SECRET`
//! - `CADENCE_MICROSOFT_CLIENT_ID` / `CADENCE_MICROSOFT_CLIENT_SECRET`
//! - `CADENCE_MICROSOFT_TODO_LIST`: Target To Do list id
//! - `CADENCE_JIRA_CLIENT_ID` / `CADENCE_JIRA_CLIENT_SECRET`
//! - `CADENCE_JIRA_BASE_URL`: Jira site base URL
//! - `CADENCE_JIRA_PROJECT_KEY`: Project issues are created under
//! - `CADENCE_JIRA_DONE_TRANSITION`: Optional done-transition id
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./cadence.json` or `./cadence.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)

use std::path::{Path, PathBuf};

use cadence_domain::{
    CadenceError, Config, DatabaseConfig, IntegrationsConfig, JiraConfig, MicrosoftConfig,
    OAuthAppConfig, Result, SyncConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `CadenceError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Errors
/// Returns `CadenceError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("CADENCE_DB_PATH")?;
    let db_pool_size = env_var("CADENCE_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| CadenceError::Config(format!("Invalid pool size: {e}")))
    })?;

    let provider_timeout = env_parse_or("CADENCE_PROVIDER_TIMEOUT", 5u64)?;
    let refresh_threshold = env_parse_or("CADENCE_REFRESH_THRESHOLD", 60i64)?;
    let sync_enabled = env_bool("CADENCE_SYNC_ENABLED", true);

    let google = OAuthAppConfig {
        client_id: env_var("CADENCE_GOOGLE_CLIENT_ID")?,
        client_secret: std::env::var("CADENCE_GOOGLE_CLIENT_SECRET").ok(),
        token_endpoint: None,
    };
    let microsoft = MicrosoftConfig {
        oauth: OAuthAppConfig {
            client_id: env_var("CADENCE_MICROSOFT_CLIENT_ID")?,
            client_secret: std::env::var("CADENCE_MICROSOFT_CLIENT_SECRET").ok(),
            token_endpoint: None,
        },
        todo_list_id: env_var("CADENCE_MICROSOFT_TODO_LIST")?,
    };
    let jira = JiraConfig {
        oauth: OAuthAppConfig {
            client_id: env_var("CADENCE_JIRA_CLIENT_ID")?,
            client_secret: std::env::var("CADENCE_JIRA_CLIENT_SECRET").ok(),
            token_endpoint: None,
        },
        base_url: env_var("CADENCE_JIRA_BASE_URL")?,
        project_key: env_var("CADENCE_JIRA_PROJECT_KEY")?,
        done_transition_id: std::env::var("CADENCE_JIRA_DONE_TRANSITION").ok(),
    };

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        sync: SyncConfig {
            provider_timeout_secs: provider_timeout,
            refresh_threshold_secs: refresh_threshold,
            enabled: sync_enabled,
        },
        integrations: IntegrationsConfig { google, microsoft, jira },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CadenceError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => probe_config_paths().ok_or_else(|| {
            CadenceError::Config("no configuration file found in probed locations".into())
        })?,
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        CadenceError::Config(format!("failed to read config file {}: {e}", path.display()))
    })?;

    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(|e| {
            CadenceError::Config(format!("invalid JSON in {}: {e}", path.display()))
        })?,
        Some("toml") => toml::from_str(&contents).map_err(|e| {
            CadenceError::Config(format!("invalid TOML in {}: {e}", path.display()))
        })?,
        other => {
            return Err(CadenceError::Config(format!(
                "unsupported config format: {:?}",
                other
            )))
        }
    };

    tracing::info!(path = %path.display(), "Configuration loaded from file");

    Ok(config)
}

/// Probe well-known locations for a config file.
pub fn probe_config_paths() -> Option<PathBuf> {
    const CANDIDATES: &[&str] = &[
        "config.json",
        "config.toml",
        "cadence.json",
        "cadence.toml",
        "../config.json",
        "../config.toml",
    ];

    CANDIDATES.iter().map(PathBuf::from).find(|path| path.is_file())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| CadenceError::Config(format!("missing environment variable {name}")))
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| CadenceError::Config(format!("invalid value for {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_loading_parses_toml() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[database]
path = "cadence.db"
pool_size = 4

[sync]
provider_timeout_secs = 5
refresh_threshold_secs = 60
enabled = true

[integrations.google]
client_id = "google-app"

[integrations.microsoft]
client_id = "microsoft-app"
todo_list_id = "list-1"

[integrations.jira]
client_id = "jira-app"
base_url = "https://example.atlassian.net"
project_key = "CAD"
"#,
        )
        .unwrap();

        let config = load_from_file(Some(&path)).unwrap();
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.integrations.jira.project_key, "CAD");
        assert_eq!(config.integrations.microsoft.todo_list_id, "list-1");
        assert!(config.integrations.google.client_secret.is_none());
    }

    #[test]
    fn file_loading_parses_json() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "database": { "path": "cadence.db", "pool_size": 8 },
                "sync": {
                    "provider_timeout_secs": 3,
                    "refresh_threshold_secs": 120,
                    "enabled": false
                },
                "integrations": {
                    "google": { "client_id": "google-app" },
                    "microsoft": { "client_id": "microsoft-app", "todo_list_id": "list-1" },
                    "jira": {
                        "client_id": "jira-app",
                        "base_url": "https://example.atlassian.net",
                        "project_key": "CAD"
                    }
                }
            })
            .to_string(),
        )
        .unwrap();

        let config = load_from_file(Some(&path)).unwrap();
        assert_eq!(config.sync.provider_timeout_secs, 3);
        assert!(!config.sync.enabled);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "database: {}").unwrap();

        let result = load_from_file(Some(&path));
        assert!(matches!(result, Err(CadenceError::Config(_))));
    }
}
