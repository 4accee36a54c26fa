//! Notification Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Largest recipient list accepted by a bulk dispatch
pub const MAX_BULK_RECIPIENTS: usize = 100;

/// A stored notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    /// Free-form type tag such as `mention` or `room_invite`
    pub kind: String,
    pub room_id: Option<Uuid>,
    pub message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/notifications/bulk`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BulkNotificationRequest {
    pub recipient_ids: Vec<Uuid>,
    pub kind: String,
    #[serde(default)]
    pub room_id: Option<Uuid>,
    #[serde(default)]
    pub message_id: Option<Uuid>,
}

impl BulkNotificationRequest {
    /// Validate and return the distinct recipients, excluding `sender_id`
    pub fn recipients(&self, sender_id: Uuid) -> Result<Vec<Uuid>, SharedError> {
        if self.kind.trim().is_empty() {
            return Err(SharedError::validation("kind", "Notification type is required"));
        }
        if self.recipient_ids.is_empty() {
            return Err(SharedError::validation("recipient_ids", "At least one recipient is required"));
        }
        if self.recipient_ids.len() > MAX_BULK_RECIPIENTS {
            return Err(SharedError::validation(
                "recipient_ids",
                format!("At most {} recipients per dispatch", MAX_BULK_RECIPIENTS),
            ));
        }
        let mut recipients = Vec::with_capacity(self.recipient_ids.len());
        for id in &self.recipient_ids {
            if *id != sender_id && !recipients.contains(id) {
                recipients.push(*id);
            }
        }
        Ok(recipients)
    }
}

/// Response of `POST /api/notifications/bulk`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkNotificationResponse {
    pub created: usize,
}
