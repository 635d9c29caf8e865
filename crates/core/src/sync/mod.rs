//! Synchronization orchestrator, eligibility policy, and ports

pub mod policy;
pub mod ports;
pub mod service;

pub use policy::SyncPolicy;
pub use ports::{fallback_description, CommitmentStore, PlainDescriber, TaskAdapter, TaskDescriber};
pub use service::SyncOrchestrator;
