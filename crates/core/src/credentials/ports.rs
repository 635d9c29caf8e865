//! Port interfaces for credential storage and token refresh

use async_trait::async_trait;
use cadence_domain::{IntegrationCredential, IntegrationFamily, Provider, Result, TokenSet};

/// Trait for persisting OAuth2 credentials keyed by
/// (profile, family, provider)
///
/// Callers pass the *storage* family (see
/// [`Provider::storage_family`](cadence_domain::Provider::storage_family));
/// implementations do not re-normalize.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the credential row for a profile/family/provider triple.
    async fn find(
        &self,
        profile_id: &str,
        family: IntegrationFamily,
        provider: Provider,
    ) -> Result<Option<IntegrationCredential>>;

    /// Insert or replace a credential row (OAuth callback).
    async fn upsert(&self, credential: &IntegrationCredential) -> Result<()>;

    /// Update token material in place (refresh), leaving the enabled flag
    /// untouched.
    async fn update_tokens(
        &self,
        profile_id: &str,
        family: IntegrationFamily,
        provider: Provider,
        tokens: &TokenSet,
    ) -> Result<()>;

    /// Remove a credential row (explicit disconnect).
    async fn remove(
        &self,
        profile_id: &str,
        family: IntegrationFamily,
        provider: Provider,
    ) -> Result<()>;
}

/// Trait for exchanging a refresh token for fresh token material
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Call the provider's token endpoint with a refresh token.
    ///
    /// The returned `TokenSet` may omit the refresh token; callers preserve
    /// the previous one in that case.
    async fn refresh(&self, provider: Provider, refresh_token: &str) -> Result<TokenSet>;
}
