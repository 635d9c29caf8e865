//! Credential storage ports and the token lifecycle manager

pub mod manager;
pub mod ports;

pub use manager::TokenLifecycleManager;
pub use ports::{CredentialStore, TokenRefresher};
