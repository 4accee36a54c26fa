//! ChatBloom API Client
//!
//! One async method per endpoint the room view uses. Every request carries
//! the session token as a bearer header, except the unload beacon which
//! sends it in the body.

use reqwest::{
    header::{ACCEPT, CONTENT_ENCODING, CONTENT_TYPE},
    Client, Response,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::compression::gzip_json;
use super::config::ClientConfig;
use super::error::ApiError;
use crate::shared::message::{
    DeletedResponse, ListMessagesQuery, MessageWithAuthor, SendBatchRequest, SendBatchResponse, SendMessageRequest,
    SendMessageResponse,
};
use crate::shared::room::{JoinRoomRequest, JoinRoomResponse, LeaveBeaconRequest, MembershipResponse};

/// HTTP client bound to one session token
#[derive(Clone)]
pub struct ChatApi {
    client: Client,
    config: ClientConfig,
    token: String,
}

impl std::fmt::Debug for ChatApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatApi")
            .field("api_url", &self.config.api_url)
            .finish_non_exhaustive()
    }
}

impl ChatApi {
    pub fn new(config: ClientConfig, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            config,
            token: token.into(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one message
    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<SendMessageResponse, ApiError> {
        let response = self
            .client
            .post(self.config.endpoint("/api/messages"))
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    /// Send a batch, gzip-compressed unless disabled
    ///
    /// Falls back to a plain JSON body if compression fails.
    pub async fn send_batch(&self, request: &SendBatchRequest) -> Result<SendBatchResponse, ApiError> {
        let builder = self
            .client
            .post(self.config.endpoint("/api/messages/batch"))
            .bearer_auth(&self.token);

        let compressed = if self.config.compress_batches {
            match gzip_json(request) {
                Ok(body) => Some(body),
                Err(e) => {
                    tracing::warn!("[Client] Batch compression failed, sending plain JSON: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let builder = match compressed {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .header(CONTENT_ENCODING, "gzip")
                .body(body),
            None => builder.json(request),
        };

        decode(builder.send().await?).await
    }

    /// A page of room history, oldest first
    pub async fn list_messages(
        &self,
        room_id: Uuid,
        query: &ListMessagesQuery,
    ) -> Result<Vec<MessageWithAuthor>, ApiError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(before) = query.before {
            params.push(("before", before.to_string()));
        }

        let response = self
            .client
            .get(self.config.endpoint(&format!("/api/rooms/{}/messages", room_id)))
            .bearer_auth(&self.token)
            .query(&params)
            .send()
            .await?;
        decode(response).await
    }

    /// Fetch one message with its author
    pub async fn get_message(&self, message_id: Uuid) -> Result<MessageWithAuthor, ApiError> {
        let response = self
            .client
            .get(self.config.endpoint(&format!("/api/messages/{}", message_id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode(response).await
    }

    /// Delete one of the caller's messages
    pub async fn delete_message(&self, message_id: Uuid) -> Result<DeletedResponse, ApiError> {
        let response = self
            .client
            .delete(self.config.endpoint(&format!("/api/messages/{}", message_id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode(response).await
    }

    /// Join a room, optionally with an invite token
    pub async fn join_room(&self, room_id: Uuid, invite_token: Option<&str>) -> Result<JoinRoomResponse, ApiError> {
        let body = JoinRoomRequest {
            invite_token: invite_token.map(str::to_string),
        };
        let response = self
            .client
            .post(self.config.endpoint(&format!("/api/rooms/{}/join", room_id)))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    /// Refresh membership liveness
    pub async fn heartbeat(&self, room_id: Uuid) -> Result<MembershipResponse, ApiError> {
        let response = self
            .client
            .post(self.config.endpoint(&format!("/api/rooms/{}/heartbeat", room_id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode(response).await
    }

    /// Leave a room
    pub async fn leave_room(&self, room_id: Uuid) -> Result<MembershipResponse, ApiError> {
        let response = self
            .client
            .post(self.config.endpoint(&format!("/api/rooms/{}/leave", room_id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode(response).await
    }

    /// Unload-time leave carrying the token in a plain-text body
    pub async fn leave_beacon(&self, room_id: Uuid) -> Result<(), ApiError> {
        let body = serde_json::to_vec(&LeaveBeaconRequest {
            access_token: self.token.clone(),
        })
        .map_err(|e| ApiError::Decode(e.to_string()))?;

        let response = self
            .client
            .post(self.config.endpoint(&format!("/api/rooms/{}/leave-beacon", room_id)))
            .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(body)
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    /// Open the room's change feed; the body is an SSE stream
    pub async fn subscribe_changes(&self, room_id: Uuid) -> Result<Response, ApiError> {
        let response = self
            .client
            .get(self.config.endpoint(&format!("/api/rooms/{}/changes", room_id)))
            .bearer_auth(&self.token)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        check(response).await
    }
}

/// Turn a non-success response into `ApiError::Status`
///
/// The message is taken from the `{"error": ...}` body when present.
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.to_string()
            } else {
                text
            }
        });

    tracing::debug!("[Client] Request failed with {}: {}", status, message);
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check(response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}
