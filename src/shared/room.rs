//! Room Data Structures
//!
//! Rooms, room membership and the request/response payloads of the room
//! endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Longest accepted room name, in characters
pub const MAX_ROOM_NAME_LEN: usize = 80;

/// Longest accepted room topic, in characters
pub const MAX_ROOM_TOPIC_LEN: usize = 280;

/// A chat room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub topic: Option<String>,
    pub emoji: Option<String>,
    pub is_private: bool,
    /// Member cap; `None` means unlimited
    pub max_members: Option<u32>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Whether `user_id` owns this room
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// A room together with its current member count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomSummary {
    #[serde(flatten)]
    pub room: Room,
    pub member_count: i64,
}

/// Membership row pairing a room and a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomMember {
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub joined_at: DateTime<Utc>,
    /// Liveness timestamp refreshed by heartbeats
    pub last_seen: DateTime<Utc>,
}

/// Body of `POST /api/rooms`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub max_members: Option<u32>,
}

impl CreateRoomRequest {
    /// Validate and normalise the request, returning the trimmed name
    pub fn validate(&self) -> Result<String, SharedError> {
        let name = validate_room_name(&self.name)?;
        validate_topic(self.topic.as_deref())?;
        validate_max_members(self.max_members)?;
        Ok(name)
    }
}

/// Body of `PATCH /api/rooms/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRoomRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub is_private: Option<bool>,
    /// `None` leaves the cap alone, `Some(None)` (JSON `null`) removes it
    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub max_members: Option<Option<u32>>,
}

/// Distinguish an explicit `null` from an absent field
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateRoomRequest {
    /// Apply the update on top of `room`, validating every changed field
    pub fn apply_to(&self, room: &Room) -> Result<Room, SharedError> {
        let mut updated = room.clone();
        if let Some(name) = &self.name {
            updated.name = validate_room_name(name)?;
        }
        if let Some(topic) = &self.topic {
            validate_topic(Some(topic))?;
            updated.topic = non_empty(topic);
        }
        if let Some(emoji) = &self.emoji {
            updated.emoji = non_empty(emoji);
        }
        if let Some(is_private) = self.is_private {
            updated.is_private = is_private;
        }
        if let Some(max_members) = self.max_members {
            validate_max_members(max_members)?;
            updated.max_members = max_members;
        }
        Ok(updated)
    }
}

/// Body of `POST /api/rooms/{id}/join`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JoinRoomRequest {
    #[serde(default)]
    pub invite_token: Option<String>,
}

/// Result of a successful join
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinRoomResponse {
    pub room_id: Uuid,
    /// `false` when the caller was already a member
    pub newly_joined: bool,
    pub member_count: i64,
}

/// Body of the unload-time leave beacon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveBeaconRequest {
    pub access_token: String,
}

/// Response of heartbeat and leave
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembershipResponse {
    pub room_id: Uuid,
    pub is_member: bool,
}

fn validate_room_name(name: &str) -> Result<String, SharedError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SharedError::validation("name", "Room name is required"));
    }
    if trimmed.chars().count() > MAX_ROOM_NAME_LEN {
        return Err(SharedError::validation(
            "name",
            format!("Room name must be at most {} characters", MAX_ROOM_NAME_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_topic(topic: Option<&str>) -> Result<(), SharedError> {
    match topic {
        Some(topic) if topic.chars().count() > MAX_ROOM_TOPIC_LEN => Err(SharedError::validation(
            "topic",
            format!("Topic must be at most {} characters", MAX_ROOM_TOPIC_LEN),
        )),
        _ => Ok(()),
    }
}

fn validate_max_members(max_members: Option<u32>) -> Result<(), SharedError> {
    match max_members {
        Some(0) => Err(SharedError::validation(
            "max_members",
            "Room must allow at least one member",
        )),
        _ => Ok(()),
    }
}

/// Trim and drop empty optional text
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
