//! SQLite-backed implementation of the CredentialStore port.

use async_trait::async_trait;
use cadence_core::CredentialStore;
use cadence_domain::{
    CadenceError, IntegrationCredential, IntegrationFamily, Provider, Result, TokenSet,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, instrument};

use super::manager::Database;
use crate::errors::InfraError;

/// SQLite implementation of the credential store.
///
/// One row per (profile, family, provider); token material is updated in
/// place on refresh so the enabled flag and row identity survive.
pub struct SqliteCredentialRepository {
    db: Database,
}

impl SqliteCredentialRepository {
    /// Create a new credential repository.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Flip the enabled flag without touching token material.
    #[instrument(skip(self))]
    pub fn set_enabled(
        &self,
        profile_id: &str,
        family: IntegrationFamily,
        provider: Provider,
        enabled: bool,
    ) -> Result<()> {
        let conn = self.db.get()?;
        let changed = conn
            .execute(
                "UPDATE integration_credentials SET enabled = ?4, updated_at = ?5
                 WHERE profile_id = ?1 AND family = ?2 AND provider = ?3",
                params![
                    profile_id,
                    family.as_str(),
                    provider.as_str(),
                    enabled,
                    Utc::now().timestamp()
                ],
            )
            .map_err(InfraError::from)?;

        if changed == 0 {
            return Err(CadenceError::NotFound(format!(
                "credential for {}/{}/{}",
                profile_id,
                family.as_str(),
                provider.as_str()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        profile_id: &str,
        family: IntegrationFamily,
        provider: Provider,
    ) -> Result<Option<IntegrationCredential>> {
        let conn = self.db.get()?;

        let row = conn
            .query_row(
                "SELECT access_token, refresh_token, expires_at, enabled, updated_at
                 FROM integration_credentials
                 WHERE profile_id = ?1 AND family = ?2 AND provider = ?3",
                params![profile_id, family.as_str(), provider.as_str()],
                |row| {
                    let expires_at: Option<i64> = row.get(2)?;
                    Ok(IntegrationCredential {
                        profile_id: profile_id.to_string(),
                        family,
                        provider,
                        tokens: TokenSet {
                            access_token: row.get(0)?,
                            refresh_token: row.get(1)?,
                            expires_at: expires_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
                        },
                        enabled: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(InfraError::from)?;

        Ok(row)
    }

    #[instrument(skip(self, credential))]
    async fn upsert(&self, credential: &IntegrationCredential) -> Result<()> {
        let conn = self.db.get()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO integration_credentials (
                profile_id, family, provider, access_token, refresh_token,
                expires_at, enabled, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(profile_id, family, provider) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                enabled = excluded.enabled,
                updated_at = excluded.updated_at",
            params![
                credential.profile_id,
                credential.family.as_str(),
                credential.provider.as_str(),
                credential.tokens.access_token,
                credential.tokens.refresh_token,
                credential.tokens.expires_at.map(|t| t.timestamp()),
                credential.enabled,
                now
            ],
        )
        .map_err(InfraError::from)?;

        debug!(
            profile_id = %credential.profile_id,
            provider = credential.provider.as_str(),
            "stored integration credential"
        );

        Ok(())
    }

    #[instrument(skip(self, tokens))]
    async fn update_tokens(
        &self,
        profile_id: &str,
        family: IntegrationFamily,
        provider: Provider,
        tokens: &TokenSet,
    ) -> Result<()> {
        let conn = self.db.get()?;

        let changed = conn
            .execute(
                "UPDATE integration_credentials
                 SET access_token = ?4, refresh_token = ?5, expires_at = ?6, updated_at = ?7
                 WHERE profile_id = ?1 AND family = ?2 AND provider = ?3",
                params![
                    profile_id,
                    family.as_str(),
                    provider.as_str(),
                    tokens.access_token,
                    tokens.refresh_token,
                    tokens.expires_at.map(|t| t.timestamp()),
                    Utc::now().timestamp()
                ],
            )
            .map_err(InfraError::from)?;

        if changed == 0 {
            return Err(CadenceError::NotFound(format!(
                "credential for {}/{}/{}",
                profile_id,
                family.as_str(),
                provider.as_str()
            )));
        }

        debug!(profile_id, provider = provider.as_str(), "updated token material in place");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(
        &self,
        profile_id: &str,
        family: IntegrationFamily,
        provider: Provider,
    ) -> Result<()> {
        let conn = self.db.get()?;

        conn.execute(
            "DELETE FROM integration_credentials
             WHERE profile_id = ?1 AND family = ?2 AND provider = ?3",
            params![profile_id, family.as_str(), provider.as_str()],
        )
        .map_err(InfraError::from)?;

        debug!(profile_id, provider = provider.as_str(), "removed integration credential");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn setup() -> (SqliteCredentialRepository, TempDir) {
        let temp = TempDir::new().unwrap();
        let db = Database::open(temp.path().join("test.db"), 2).unwrap();
        let conn = db.get().unwrap();
        conn.execute(
            "INSERT INTO profiles (id, name, preferences, created_at) VALUES ('p1', 'Test', '{}', 0)",
            params![],
        )
        .unwrap();
        (SqliteCredentialRepository::new(db), temp)
    }

    fn credential(access: &str) -> IntegrationCredential {
        IntegrationCredential {
            profile_id: "p1".into(),
            family: IntegrationFamily::Calendar,
            provider: Provider::Google,
            tokens: TokenSet::new(access.into(), Some("refresh".into()), 3600),
            enabled: true,
            updated_at: Utc::now().timestamp(),
        }
    }

    #[tokio::test]
    async fn upsert_and_find_round_trip() {
        let (repo, _temp) = setup();

        repo.upsert(&credential("access-1")).await.unwrap();

        let found = repo
            .find("p1", IntegrationFamily::Calendar, Provider::Google)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.tokens.access_token, "access-1");
        assert_eq!(found.tokens.refresh_token.as_deref(), Some("refresh"));
        assert!(found.enabled);
        assert!(found.tokens.expires_at.is_some());
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let (repo, _temp) = setup();

        let found = repo.find("p1", IntegrationFamily::Task, Provider::Jira).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_row() {
        let (repo, _temp) = setup();

        repo.upsert(&credential("access-1")).await.unwrap();
        repo.upsert(&credential("access-2")).await.unwrap();

        let found = repo
            .find("p1", IntegrationFamily::Calendar, Provider::Google)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.tokens.access_token, "access-2");
    }

    #[tokio::test]
    async fn update_tokens_preserves_enabled_flag() {
        let (repo, _temp) = setup();

        repo.upsert(&credential("access-1")).await.unwrap();
        repo.set_enabled("p1", IntegrationFamily::Calendar, Provider::Google, false).unwrap();

        let fresh = TokenSet::new("access-2".into(), Some("refresh-2".into()), 3600);
        repo.update_tokens("p1", IntegrationFamily::Calendar, Provider::Google, &fresh)
            .await
            .unwrap();

        let found = repo
            .find("p1", IntegrationFamily::Calendar, Provider::Google)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.tokens.access_token, "access-2");
        assert!(!found.enabled);
    }

    #[tokio::test]
    async fn update_tokens_on_missing_row_is_not_found() {
        let (repo, _temp) = setup();

        let fresh = TokenSet::new("access".into(), None, 3600);
        let result =
            repo.update_tokens("p1", IntegrationFamily::Task, Provider::Jira, &fresh).await;

        assert!(matches!(result, Err(CadenceError::NotFound(_))));
    }

    #[tokio::test]
    async fn remove_deletes_the_row() {
        let (repo, _temp) = setup();

        repo.upsert(&credential("access-1")).await.unwrap();
        repo.remove("p1", IntegrationFamily::Calendar, Provider::Google).await.unwrap();

        let found =
            repo.find("p1", IntegrationFamily::Calendar, Provider::Google).await.unwrap();
        assert!(found.is_none());
    }
}
