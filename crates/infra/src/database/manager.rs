//! Database connection manager backed by an r2d2/rusqlite pool.

use std::path::{Path, PathBuf};

use cadence_domain::{DatabaseConfig, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::info;

use crate::errors::InfraError;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Pooled connection type used by the repositories.
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database manager that wraps an r2d2 SQLite pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl Database {
    /// Open (or create) the database and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(db_path: P, pool_size: u32) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();

        let manager = SqliteConnectionManager::file(&path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;")
        });

        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .map_err(InfraError::from)?;

        let database = Self { pool, path };
        database.ensure_schema()?;

        info!(db_path = %database.path.display(), pool_size, "sqlite pool initialised");

        Ok(database)
    }

    /// Open from configuration.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::open(&config.path, config.pool_size)
    }

    /// Acquire a connection from the pool.
    pub fn get(&self) -> Result<DbConnection> {
        self.pool.get().map_err(|e| InfraError::from(e).into())
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Perform a health check to verify database connectivity.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))
            .map_err(InfraError::from)?;
        Ok(())
    }

    /// Ensure the fixed schema exists on the current database.
    fn ensure_schema(&self) -> Result<()> {
        let conn = self.get()?;
        conn.execute_batch(SCHEMA_SQL).map_err(InfraError::from)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, CAST(strftime('%s','now') AS INTEGER))",
            params![SCHEMA_VERSION],
        )
        .map_err(InfraError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn open_creates_schema_and_passes_health_check() {
        let temp = TempDir::new().unwrap();
        let database = Database::open(temp.path().join("test.db"), 2).unwrap();

        database.health_check().unwrap();

        let conn = database.get().unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                 AND name IN ('profiles','commitments','integration_credentials')",
                params![],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn reopening_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.db");

        Database::open(&path, 2).unwrap();
        let database = Database::open(&path, 2).unwrap();
        database.health_check().unwrap();
    }
}
