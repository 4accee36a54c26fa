/**
 * Room Change Events
 *
 * This module defines the change-feed event pushed to room subscribers when
 * a message row is inserted or deleted. Events carry identifiers only; a
 * subscriber fetches the full record (with author display data) on demand.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of row change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// A message was inserted
    Insert,
    /// A message was deleted
    Delete,
}

impl ChangeType {
    /// SSE event name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Insert => "insert",
            ChangeType::Delete => "delete",
        }
    }
}

/// A single row change in a room's message table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Type of change
    pub event_type: ChangeType,
    /// Room the changed message belongs to
    pub room_id: Uuid,
    /// Message id
    pub record_id: Uuid,
    /// User whose action produced the change
    pub actor_id: Uuid,
    /// RFC 3339 timestamp of the change
    pub timestamp: String,
}

impl ChangeEvent {
    /// Create a new change event stamped with the current time
    pub fn new(event_type: ChangeType, room_id: Uuid, record_id: Uuid, actor_id: Uuid) -> Self {
        Self {
            event_type,
            room_id,
            record_id,
            actor_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an insert event
    pub fn insert(room_id: Uuid, record_id: Uuid, actor_id: Uuid) -> Self {
        Self::new(ChangeType::Insert, room_id, record_id, actor_id)
    }

    /// Create a delete event
    pub fn delete(room_id: Uuid, record_id: Uuid, actor_id: Uuid) -> Self {
        Self::new(ChangeType::Delete, room_id, record_id, actor_id)
    }
}
