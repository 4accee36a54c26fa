//! User Profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display data for a user, keyed by the auth provider's subject id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    /// Anonymous session without a registered account
    pub is_guest: bool,
    pub created_at: DateTime<Utc>,
}

/// Username shown for a guest without a chosen name
pub fn guest_username(id: Uuid) -> String {
    let simple = id.simple().to_string();
    format!("guest-{}", &simple[..6])
}
