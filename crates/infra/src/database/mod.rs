//! Database implementations

pub mod commitment_repository;
pub mod credential_repository;
pub mod manager;

pub use commitment_repository::SqliteCommitmentRepository;
pub use credential_repository::SqliteCredentialRepository;
pub use manager::Database;
