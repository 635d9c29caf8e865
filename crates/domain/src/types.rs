//! Domain data types
//!
//! Row-level types for the fixed relational schema plus the structured
//! outcome report returned by the synchronization orchestrator.

pub mod commitment;
pub mod credential;
pub mod profile;
pub mod report;

pub use commitment::{Commitment, CommitmentStatus, ExternalLink, Priority, TaskType};
pub use credential::{IntegrationCredential, IntegrationFamily, Provider, TokenSet};
pub use profile::Profile;
pub use report::{LifecycleEvent, ProviderOutcome, SkipReason, SyncOutcome, SyncReport};
