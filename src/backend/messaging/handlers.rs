//! Message HTTP Handlers
//!
//! Single and batch send, history, lookup and delete. Every successful
//! insert or delete is published on the room's change feed after the
//! write has been committed.

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use uuid::Uuid;

use super::db;
use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, Json, Path, Query, SessionUser};
use crate::backend::rooms::handlers::load_visible_room;
use crate::backend::server::state::AppState;
use crate::shared::message::{
    BatchResult, DeletedResponse, ListMessagesQuery, Message, MessageDraft, MessageWithAuthor, SendBatchRequest,
    SendBatchResponse, SendMessageRequest, SendMessageResponse,
};
use crate::shared::ChangeEvent;

fn with_author(message: Message, user: &SessionUser) -> MessageWithAuthor {
    MessageWithAuthor {
        message,
        author_username: user.username.clone(),
        author_is_guest: user.is_guest,
    }
}

/// Send a single message
///
/// Guests may send text but not media.
///
/// # Errors
/// * `400 Bad Request` - empty, oversized or malformed message
/// * `403 Forbidden` - guest sending media, or private room the caller cannot see
/// * `404 Not Found` - unknown room
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), BackendError> {
    let server_received_at = Utc::now();
    let draft = MessageDraft::parse(&request.content, request.media_url.as_deref(), request.media_type)?;
    if draft.has_media() {
        user.require_account("share media")?;
    }

    let room = load_visible_room(&state.pool, request.room_id, &user).await?;

    let mut conn = state.pool.acquire().await?;
    let message = db::insert_message(&mut conn, room.id, user.user_id, &draft).await?;
    drop(conn);

    state
        .feed
        .publish(ChangeEvent::insert(room.id, message.id, user.user_id));
    tracing::info!("[Messages] {} sent {} to room {}", user.user_id, message.id, room.id);

    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            message: with_author(message, &user),
            temp_id: request.temp_id,
            client_sent_at: request.client_sent_at,
            server_received_at,
        }),
    ))
}

/// Send several messages at once
///
/// The body may be gzip-compressed (`Content-Encoding: gzip`). The batch
/// is stored atomically and results come back in submission order.
pub async fn send_batch(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<SendBatchRequest>,
) -> Result<(StatusCode, Json<SendBatchResponse>), BackendError> {
    let drafts = request.validate()?;
    if drafts.iter().any(|(_, draft)| draft.has_media()) {
        user.require_account("share media")?;
    }

    let room = load_visible_room(&state.pool, request.room_id, &user).await?;
    let stored = db::insert_batch(&state.pool, room.id, user.user_id, &drafts).await?;

    for (_, message) in &stored {
        state
            .feed
            .publish(ChangeEvent::insert(room.id, message.id, user.user_id));
    }
    tracing::info!(
        "[Messages] {} sent a batch of {} to room {}",
        user.user_id,
        stored.len(),
        room.id
    );

    let results = stored
        .into_iter()
        .map(|(temp_id, message)| BatchResult {
            temp_id,
            message: with_author(message, &user),
        })
        .collect();

    Ok((StatusCode::CREATED, Json(SendBatchResponse { results })))
}

/// Room history, oldest first
pub async fn list_messages(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<MessageWithAuthor>>, BackendError> {
    let room = load_visible_room(&state.pool, room_id, &user).await?;
    let page = db::list_messages(&state.pool, room.id, query.page_size(), query.before).await?;
    Ok(Json(page))
}

/// Fetch one message with author display data
///
/// Used by change-feed subscribers to hydrate insert events.
pub async fn get_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<MessageWithAuthor>, BackendError> {
    let message = db::get_message(&state.pool, message_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Message not found"))?;
    load_visible_room(&state.pool, message.message.room_id, &user).await?;
    Ok(Json(message))
}

/// Delete one of the caller's own messages
///
/// # Errors
/// * `404 Not Found` - unknown message
/// * `403 Forbidden` - caller is not the author
pub async fn delete_message(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, BackendError> {
    let message = db::get_message(&state.pool, message_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Message not found"))?;

    if message.message.author_id != user.user_id {
        tracing::warn!("[Messages] {} tried to delete message {} by another user", user.user_id, message_id);
        return Err(BackendError::forbidden("You can only delete your own messages"));
    }

    let deleted = db::delete_message(&state.pool, message_id).await?;
    if deleted {
        state
            .feed
            .publish(ChangeEvent::delete(message.message.room_id, message_id, user.user_id));
        tracing::info!("[Messages] {} deleted message {}", user.user_id, message_id);
    }

    Ok(Json(DeletedResponse {
        id: message_id,
        deleted,
    }))
}
