//! OAuth2 credential types
//!
//! Defines the per-profile integration credential row and the token
//! material stored inside it. One credential exists per
//! (profile, family, provider); Microsoft deliberately collapses its
//! calendar and task integrations onto a single row (same token, different
//! API scopes), expressed here by [`Provider::storage_family`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External resource family an integration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationFamily {
    Calendar,
    Task,
}

impl IntegrationFamily {
    /// Database column representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Task => "task",
        }
    }

    /// Parse the database column representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "calendar" => Some(Self::Calendar),
            "task" => Some(Self::Task),
            _ => None,
        }
    }
}

/// Concrete provider implementation of an integration family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Microsoft,
    Jira,
}

impl Provider {
    /// Database column representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
            Self::Jira => "jira",
        }
    }

    /// Parse the database column representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "google" => Some(Self::Google),
            "microsoft" => Some(Self::Microsoft),
            "jira" => Some(Self::Jira),
            _ => None,
        }
    }

    /// Family under which this provider's credential row is stored.
    ///
    /// Microsoft's calendar and task integrations share one credential row
    /// (stored under `calendar`); every other provider stores under its own
    /// family.
    #[must_use]
    pub fn storage_family(self, family: IntegrationFamily) -> IntegrationFamily {
        match self {
            Self::Microsoft => IntegrationFamily::Calendar,
            Self::Google | Self::Jira => family,
        }
    }
}

/// OAuth2 access and refresh tokens with expiry metadata
///
/// The refresh token is optional because not all providers reissue one on
/// refresh; callers preserve the previous refresh token in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token presented as a bearer credential
    pub access_token: String,

    /// Refresh token for obtaining new access tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Absolute expiration timestamp (UTC), calculated from the provider's
    /// `expires_in` at creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    /// Create a new `TokenSet`, computing `expires_at` from `expires_in`.
    ///
    /// An `expires_in` of zero or less leaves the expiry unset.
    #[must_use]
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        let expires_at = if expires_in > 0 {
            Some(Utc::now() + chrono::Duration::seconds(expires_in))
        } else {
            None
        };

        Self { access_token, refresh_token, expires_at }
    }

    /// Check whether the access token is expired or will expire within the
    /// given threshold.
    ///
    /// A token without a recorded expiry is treated as not expired.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let threshold = chrono::Duration::seconds(threshold_seconds);
                Utc::now() + threshold >= expires_at
            }
            None => false,
        }
    }

    /// Seconds until expiry, or `None` if no expiry is recorded.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }
}

/// IntegrationCredential - one OAuth2 credential row
///
/// Created on the OAuth callback, updated in place on refresh, removed on
/// explicit disconnect. A disabled row is kept but never used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationCredential {
    pub profile_id: String,
    pub family: IntegrationFamily,
    pub provider: Provider,
    pub tokens: TokenSet,
    pub enabled: bool,
    pub updated_at: i64,
}

impl IntegrationCredential {
    /// Whether this credential can be presented to its provider at all:
    /// enabled and carrying non-empty token material.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.tokens.access_token.is_empty()
    }
}
