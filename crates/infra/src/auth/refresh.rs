//! OAuth2 token endpoint client for the fixed provider set.
//!
//! Implements the `TokenRefresher` port plus the authorization-code
//! exchange used by the OAuth callback route. Google and Microsoft take
//! form-encoded token requests; Atlassian takes a JSON body.

use async_trait::async_trait;
use cadence_core::TokenRefresher;
use cadence_domain::{
    CadenceError, IntegrationsConfig, OAuthAppConfig, Provider, Result, TokenSet,
};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info};

use crate::http::HttpClient;

const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const MICROSOFT_TOKEN_ENDPOINT: &str =
    "https://login.microsoftonline.com/common/oauth2/v2.0/token";
const ATLASSIAN_TOKEN_ENDPOINT: &str = "https://auth.atlassian.com/oauth/token";

const MICROSOFT_REFRESH_SCOPE: &str =
    "Calendars.ReadWrite Tasks.ReadWrite offline_access";

/// OAuth token response from an authorization server (RFC 6749).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

/// Token endpoint client for Google, Microsoft, and Atlassian.
pub struct OAuthRefreshClient {
    http: HttpClient,
    integrations: IntegrationsConfig,
}

impl OAuthRefreshClient {
    /// Create a refresh client from the integrations configuration.
    ///
    /// Token requests keep the default retry policy: the exchange is
    /// idempotent, so re-sending a timed-out request is safe.
    pub fn new(integrations: IntegrationsConfig) -> Result<Self> {
        let http = HttpClient::builder().build()?;
        Ok(Self { http, integrations })
    }

    /// Exchange an authorization code for initial token material.
    ///
    /// Called by the OAuth callback route when a profile connects an
    /// integration.
    pub async fn exchange_code(
        &self,
        provider: Provider,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet> {
        let app = self.app(provider);
        let endpoint = self.endpoint(provider);

        let request = match provider {
            Provider::Google | Provider::Microsoft => {
                let mut form = vec![
                    ("client_id", app.client_id.clone()),
                    ("code", code.to_string()),
                    ("redirect_uri", redirect_uri.to_string()),
                    ("grant_type", "authorization_code".to_string()),
                ];
                if let Some(secret) = &app.client_secret {
                    form.push(("client_secret", secret.clone()));
                }
                self.http.request(Method::POST, &endpoint).form(&form)
            }
            Provider::Jira => self.http.request(Method::POST, &endpoint).json(&serde_json::json!({
                "grant_type": "authorization_code",
                "client_id": app.client_id,
                "client_secret": app.client_secret,
                "code": code,
                "redirect_uri": redirect_uri,
            })),
        };

        let tokens = self.execute(provider, request, "authorization code exchange").await?;
        info!(provider = provider.as_str(), "exchanged authorization code for tokens");
        Ok(tokens)
    }

    async fn execute(
        &self,
        provider: Provider,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<TokenSet> {
        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            let error_text =
                response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CadenceError::Auth(format!(
                "{operation} failed ({status}): {error_text}"
            )));
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            CadenceError::Auth(format!("failed to parse token response: {e}"))
        })?;

        debug!(
            provider = provider.as_str(),
            expires_in = token_response.expires_in,
            reissued_refresh_token = token_response.refresh_token.is_some(),
            "token endpoint responded"
        );

        Ok(TokenSet::new(
            token_response.access_token,
            token_response.refresh_token,
            token_response.expires_in,
        ))
    }

    fn app(&self, provider: Provider) -> &OAuthAppConfig {
        match provider {
            Provider::Google => &self.integrations.google,
            Provider::Microsoft => &self.integrations.microsoft.oauth,
            Provider::Jira => &self.integrations.jira.oauth,
        }
    }

    fn endpoint(&self, provider: Provider) -> String {
        let default = match provider {
            Provider::Google => GOOGLE_TOKEN_ENDPOINT,
            Provider::Microsoft => MICROSOFT_TOKEN_ENDPOINT,
            Provider::Jira => ATLASSIAN_TOKEN_ENDPOINT,
        };
        self.app(provider).token_endpoint.clone().unwrap_or_else(|| default.to_string())
    }
}

#[async_trait]
impl TokenRefresher for OAuthRefreshClient {
    async fn refresh(&self, provider: Provider, refresh_token: &str) -> Result<TokenSet> {
        let app = self.app(provider);
        let endpoint = self.endpoint(provider);

        let request = match provider {
            Provider::Google => {
                let mut form = vec![
                    ("client_id", app.client_id.clone()),
                    ("refresh_token", refresh_token.to_string()),
                    ("grant_type", "refresh_token".to_string()),
                ];
                if let Some(secret) = &app.client_secret {
                    form.push(("client_secret", secret.clone()));
                }
                self.http.request(Method::POST, &endpoint).form(&form)
            }
            Provider::Microsoft => {
                let mut form = vec![
                    ("client_id", app.client_id.clone()),
                    ("refresh_token", refresh_token.to_string()),
                    ("grant_type", "refresh_token".to_string()),
                    ("scope", MICROSOFT_REFRESH_SCOPE.to_string()),
                ];
                if let Some(secret) = &app.client_secret {
                    form.push(("client_secret", secret.clone()));
                }
                self.http.request(Method::POST, &endpoint).form(&form)
            }
            Provider::Jira => self.http.request(Method::POST, &endpoint).json(&serde_json::json!({
                "grant_type": "refresh_token",
                "client_id": app.client_id,
                "client_secret": app.client_secret,
                "refresh_token": refresh_token,
            })),
        };

        self.execute(provider, request, "token refresh").await
    }
}
