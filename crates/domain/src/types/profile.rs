//! Profile record type

use serde::{Deserialize, Serialize};

/// Profile - scopes all credentials and commitments
///
/// Preferences are an opaque JSON document owned by the configuration
/// surface; this engine never interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub preferences: String,
    pub created_at: i64,
}
