//! # Cadence Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The token lifecycle manager
//! - The synchronization orchestrator and its eligibility policy
//!
//! ## Architecture Principles
//! - Only depends on `cadence-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod credentials;
pub mod sync;

// Re-export specific items to avoid ambiguity
pub use credentials::manager::TokenLifecycleManager;
pub use credentials::ports::{CredentialStore, TokenRefresher};
pub use sync::policy::SyncPolicy;
pub use sync::ports::{fallback_description, CommitmentStore, PlainDescriber, TaskAdapter, TaskDescriber};
pub use sync::service::SyncOrchestrator;
