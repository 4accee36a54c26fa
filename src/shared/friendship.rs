//! Friendship Data Structures
//!
//! A friendship is a directional request between two users that the
//! addressee may accept. Declined, cancelled and removed friendships are
//! deleted rather than kept with a terminal status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a friendship
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    /// Waiting for the addressee
    #[default]
    Pending,
    /// Accepted by the addressee
    Accepted,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(FriendshipStatus::Pending),
            "accepted" => Some(FriendshipStatus::Accepted),
            _ => None,
        }
    }
}

/// A friendship row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Friendship {
    pub id: Uuid,
    /// User who sent the request
    pub requester_id: Uuid,
    /// User who received the request
    pub addressee_id: Uuid,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Friendship {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.requester_id == user_id || self.addressee_id == user_id
    }

    /// The party that is not `user_id`
    pub fn other_party(&self, user_id: Uuid) -> Uuid {
        if self.requester_id == user_id {
            self.addressee_id
        } else {
            self.requester_id
        }
    }
}

/// Body of `POST /api/friends`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddFriendRequest {
    pub user_id: Uuid,
}

/// One entry of the friend list, seen from the caller's side
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendEntry {
    pub friendship_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub status: FriendshipStatus,
    pub since: DateTime<Utc>,
}

/// Response of `GET /api/friends`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FriendList {
    pub friends: Vec<FriendEntry>,
    /// Pending requests addressed to the caller
    pub incoming: Vec<FriendEntry>,
    /// Pending requests sent by the caller
    pub outgoing: Vec<FriendEntry>,
}
