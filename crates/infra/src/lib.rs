//! # Cadence Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Database implementations (SQLite repositories for credentials and
//!   commitments)
//! - HTTP client implementation
//! - OAuth token exchange/refresh client
//! - Provider adapters (Google Calendar, Microsoft Graph, Jira)
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `cadence-core`
//! - Depends on `cadence-domain` and `cadence-core`
//! - Contains all "impure" code (I/O, HTTP, SQL)

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;

// Re-export commonly used items
pub use auth::OAuthRefreshClient;
pub use database::{Database, SqliteCommitmentRepository, SqliteCredentialRepository};
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::{GoogleCalendarAdapter, JiraAdapter, MicrosoftGraphAdapter};
