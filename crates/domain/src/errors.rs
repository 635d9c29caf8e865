//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Cadence
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CadenceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Cadence operations
pub type Result<T> = std::result::Result<T, CadenceError>;

/// Failure taxonomy for provider-facing sync operations.
///
/// Every outbound credential or provider call resolves to one of these
/// variants. `NotConnected` means "skip this provider"; `NotFound` on
/// complete/delete is treated as success by callers.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum SyncFailure {
    /// No usable credential exists for this (profile, provider).
    #[error("integration not connected")]
    NotConnected,

    /// A credential exists but refreshing it failed; the user must
    /// reconnect. The stored credential is kept.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// Transient provider outage, network error, or timeout.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider rejected the request as invalid.
    #[error("provider rejected request: {0}")]
    Rejected(String),

    /// The external resource no longer exists.
    #[error("external resource not found")]
    NotFound,
}

/// Result type alias for provider-facing sync operations
pub type SyncResult<T> = std::result::Result<T, SyncFailure>;

impl From<CadenceError> for SyncFailure {
    /// Ambient failures crossing into a provider call degrade to the sync
    /// taxonomy: auth problems read as a refresh failure, missing resources
    /// as not-found, everything else as a transient outage.
    fn from(err: CadenceError) -> Self {
        match err {
            CadenceError::Auth(msg) => Self::RefreshFailed(msg),
            CadenceError::NotFound(_) => Self::NotFound,
            other => Self::Unavailable(other.to_string()),
        }
    }
}
