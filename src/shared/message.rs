/**
 * Message Data Structures
 *
 * Chat messages as stored and as returned to clients, plus the payloads of
 * the single and batch send endpoints.
 *
 * # Temporary identifiers
 *
 * Clients tag each outgoing draft with a `temp_id`. The server echoes it
 * back next to the stored record so the client can swap its optimistic
 * placeholder for the real message. The server never persists it.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Longest accepted message body, in characters
pub const MAX_CONTENT_LEN: usize = 4000;

/// Largest accepted batch
pub const MAX_BATCH_ITEMS: usize = 50;

/// Default page size of message history
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page of message history
pub const MAX_PAGE_SIZE: u32 = 200;

/// Kind of media attached to a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Audio => "audio",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "image" => Some(MediaType::Image),
            "audio" => Some(MediaType::Audio),
            _ => None,
        }
    }

    /// Classify a MIME type such as `image/png`
    pub fn from_mime(mime: &str) -> Option<Self> {
        let top = mime.split('/').next()?.trim().to_lowercase();
        match top.as_str() {
            "image" => Some(MediaType::Image),
            "audio" => Some(MediaType::Audio),
            _ => None,
        }
    }
}

/// A stored message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub room_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub media_url: Option<String>,
    pub media_type: Option<MediaType>,
    pub created_at: DateTime<Utc>,
}

/// A message joined with its author's display data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageWithAuthor {
    #[serde(flatten)]
    pub message: Message,
    pub author_username: String,
    pub author_is_guest: bool,
}

impl MessageWithAuthor {
    pub fn id(&self) -> Uuid {
        self.message.id
    }
}

/// A validated message body ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub content: String,
    pub media_url: Option<String>,
    pub media_type: Option<MediaType>,
}

impl MessageDraft {
    /// Validate raw fields into a draft
    ///
    /// Content is trimmed. A message needs either text or media, and media
    /// needs both a URL and a type.
    pub fn parse(
        content: &str,
        media_url: Option<&str>,
        media_type: Option<MediaType>,
    ) -> Result<Self, SharedError> {
        let content = content.trim().to_string();
        let media_url = media_url.map(str::trim).filter(|u| !u.is_empty()).map(str::to_string);

        if content.chars().count() > MAX_CONTENT_LEN {
            return Err(SharedError::validation(
                "content",
                format!("Message must be at most {} characters", MAX_CONTENT_LEN),
            ));
        }
        match (&media_url, media_type) {
            (Some(_), None) => {
                return Err(SharedError::validation("media_type", "Media type is required with media"));
            }
            (None, Some(_)) => {
                return Err(SharedError::validation("media_url", "Media URL is required with a media type"));
            }
            _ => {}
        }
        if content.is_empty() && media_url.is_none() {
            return Err(SharedError::validation("content", "Message cannot be empty"));
        }

        Ok(Self {
            content,
            media_url,
            media_type,
        })
    }

    pub fn has_media(&self) -> bool {
        self.media_url.is_some()
    }
}

/// Body of `POST /api/messages`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SendMessageRequest {
    pub room_id: Uuid,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub temp_id: Option<Uuid>,
    /// Client clock at send time, echoed back for latency measurement
    #[serde(default)]
    pub client_sent_at: Option<DateTime<Utc>>,
}

/// Response of `POST /api/messages`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageResponse {
    pub message: MessageWithAuthor,
    pub temp_id: Option<Uuid>,
    pub client_sent_at: Option<DateTime<Utc>>,
    pub server_received_at: DateTime<Utc>,
}

/// One entry of a batch send
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchItem {
    pub temp_id: Uuid,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
}

/// Body of `POST /api/messages/batch`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendBatchRequest {
    pub room_id: Uuid,
    pub items: Vec<BatchItem>,
}

impl SendBatchRequest {
    /// Validate the batch shape and every item, preserving order
    pub fn validate(&self) -> Result<Vec<(Uuid, MessageDraft)>, SharedError> {
        if self.items.is_empty() {
            return Err(SharedError::validation("items", "Batch cannot be empty"));
        }
        if self.items.len() > MAX_BATCH_ITEMS {
            return Err(SharedError::validation(
                "items",
                format!("Batch must contain at most {} messages", MAX_BATCH_ITEMS),
            ));
        }
        let mut seen = std::collections::HashSet::with_capacity(self.items.len());
        self.items
            .iter()
            .map(|item| {
                if !seen.insert(item.temp_id) {
                    return Err(SharedError::validation("temp_id", "Duplicate temp_id in batch"));
                }
                let draft = MessageDraft::parse(&item.content, item.media_url.as_deref(), item.media_type)?;
                Ok((item.temp_id, draft))
            })
            .collect()
    }
}

/// One stored record of a batch, tagged with its temp id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchResult {
    pub temp_id: Uuid,
    pub message: MessageWithAuthor,
}

/// Response of `POST /api/messages/batch`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendBatchResponse {
    pub results: Vec<BatchResult>,
}

/// Query of `GET /api/rooms/{id}/messages`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListMessagesQuery {
    #[serde(default)]
    pub limit: Option<u32>,
    /// Return only messages older than this message id
    #[serde(default)]
    pub before: Option<Uuid>,
}

impl ListMessagesQuery {
    pub fn page_size(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

/// Response of the delete endpoints (`DELETE /api/messages/{id}`, `DELETE /api/rooms/{id}`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedResponse {
    pub id: Uuid,
    pub deleted: bool,
}
