//! Room Invite Data Structures
//!
//! An invite is a bearer token granting limited access to join a private
//! room. It is usable while active, unexpired and under its use cap.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Longest accepted invite lifetime (30 days)
pub const MAX_INVITE_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// A room invite
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomInvite {
    pub id: Uuid,
    pub room_id: Uuid,
    pub token: String,
    pub created_by: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<u32>,
    pub uses: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl RoomInvite {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.uses >= max)
    }

    /// Whether a join may consume this invite at `now`
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now) && !self.is_exhausted()
    }
}

/// Body of `POST /api/rooms/{id}/invites`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateInviteRequest {
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
    #[serde(default)]
    pub max_uses: Option<u32>,
}

impl CreateInviteRequest {
    /// Validate and resolve the absolute expiry
    pub fn expires_at(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, SharedError> {
        if let Some(0) = self.max_uses {
            return Err(SharedError::validation("max_uses", "Invite must allow at least one use"));
        }
        match self.expires_in_seconds {
            None => Ok(None),
            Some(secs) if secs <= 0 => Err(SharedError::validation(
                "expires_in_seconds",
                "Expiry must be in the future",
            )),
            Some(secs) if secs > MAX_INVITE_TTL_SECONDS => Err(SharedError::validation(
                "expires_in_seconds",
                "Invites can last at most 30 days",
            )),
            Some(secs) => Ok(Some(now + Duration::seconds(secs))),
        }
    }
}

/// Response of `GET /api/invites/{token}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvitePreview {
    pub room_id: Uuid,
    pub room_name: String,
    pub room_emoji: Option<String>,
    pub usable: bool,
}
