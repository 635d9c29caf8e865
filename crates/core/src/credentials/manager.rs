//! Token lifecycle manager
//!
//! Wraps the credential store and hands out currently-valid access tokens:
//! - Missing, disabled, or empty credential: `NotConnected` (callers skip
//!   the provider)
//! - Present and unexpired: the stored access token
//! - Expired: a synchronous refresh through the provider's token endpoint,
//!   persisted before the new token is returned
//! - Refresh failure: `RefreshFailed`; the credential row is kept so a
//!   transient failure never forces re-authorization
//!
//! Concurrent callers for the same (profile, provider) may race and both
//! trigger a refresh; providers tolerate concurrent refresh of one refresh
//! token, so no per-key lock is taken.

use std::sync::Arc;

use cadence_domain::{IntegrationFamily, Provider, SyncFailure, SyncResult};
use tracing::{debug, info, warn};

use super::ports::{CredentialStore, TokenRefresher};

const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 60;

/// Hands out valid access tokens, refreshing on expiry.
pub struct TokenLifecycleManager {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    refresh_threshold_seconds: i64,
}

impl TokenLifecycleManager {
    /// Create a manager with the default refresh threshold.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self { store, refresher, refresh_threshold_seconds: DEFAULT_REFRESH_THRESHOLD_SECS }
    }

    /// Refresh tokens this many seconds before their recorded expiry.
    #[must_use]
    pub fn with_refresh_threshold(mut self, seconds: i64) -> Self {
        self.refresh_threshold_seconds = seconds.max(0);
        self
    }

    /// Get a currently-valid access token for (profile, family, provider).
    ///
    /// # Errors
    /// - `SyncFailure::NotConnected` if no usable credential exists
    /// - `SyncFailure::RefreshFailed` if the token is expired and the
    ///   refresh exchange fails (the credential is kept)
    /// - `SyncFailure::Unavailable` if the store itself fails
    pub async fn get_valid_token(
        &self,
        profile_id: &str,
        family: IntegrationFamily,
        provider: Provider,
    ) -> SyncResult<String> {
        let family = provider.storage_family(family);

        let credential = self
            .store
            .find(profile_id, family, provider)
            .await
            .map_err(|e| SyncFailure::Unavailable(e.to_string()))?
            .ok_or(SyncFailure::NotConnected)?;

        if !credential.is_usable() {
            return Err(SyncFailure::NotConnected);
        }

        if !credential.tokens.is_expired(self.refresh_threshold_seconds) {
            return Ok(credential.tokens.access_token);
        }

        let refresh_token = credential
            .tokens
            .refresh_token
            .clone()
            .ok_or_else(|| SyncFailure::RefreshFailed("no refresh token stored".to_string()))?;

        debug!(profile_id, provider = provider.as_str(), "access token expired, refreshing");

        let mut new_tokens = match self.refresher.refresh(provider, &refresh_token).await {
            Ok(tokens) => tokens,
            Err(e) => {
                // Keep the credential: a transient failure must not force
                // the user back through authorization.
                warn!(
                    profile_id,
                    provider = provider.as_str(),
                    error = %e,
                    "token refresh failed, credential retained"
                );
                return Err(SyncFailure::RefreshFailed(e.to_string()));
            }
        };

        // Not all providers reissue the refresh token.
        if new_tokens.refresh_token.is_none() {
            new_tokens.refresh_token = Some(refresh_token);
        }

        self.store
            .update_tokens(profile_id, family, provider, &new_tokens)
            .await
            .map_err(|e| SyncFailure::Unavailable(e.to_string()))?;

        info!(profile_id, provider = provider.as_str(), "refreshed access token");

        Ok(new_tokens.access_token)
    }

    /// Whether a usable credential exists for (profile, family, provider).
    ///
    /// Never fails: store errors are logged and read as "not connected".
    pub async fn is_connected(
        &self,
        profile_id: &str,
        family: IntegrationFamily,
        provider: Provider,
    ) -> bool {
        let family = provider.storage_family(family);

        match self.store.find(profile_id, family, provider).await {
            Ok(Some(credential)) => credential.is_usable(),
            Ok(None) => false,
            Err(e) => {
                warn!(
                    profile_id,
                    provider = provider.as_str(),
                    error = %e,
                    "credential lookup failed during connection check"
                );
                false
            }
        }
    }
}
