//! Room HTTP Handlers
//!
//! Create, read, update, delete and join. Ownership and visibility checks
//! shared with the invite, membership and messaging handlers live here as
//! `load_*` helpers.

use axum::{body::Bytes, extract::State, http::StatusCode};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::db::{self, JoinOutcome};
use super::invites::get_invite_by_token;
use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, Json, Path, SessionUser};
use crate::shared::message::DeletedResponse;
use crate::shared::room::{
    non_empty, CreateRoomRequest, JoinRoomRequest, JoinRoomResponse, Room, RoomSummary, UpdateRoomRequest,
};

/// Load a room or fail with 404
pub(crate) async fn load_room(pool: &SqlitePool, room_id: Uuid) -> Result<Room, BackendError> {
    db::get_room(pool, room_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Room not found"))
}

/// Load a room the caller owns
///
/// # Errors
/// * `404 Not Found` - unknown room
/// * `403 Forbidden` - caller is not the owner
pub(crate) async fn load_owned_room(
    pool: &SqlitePool,
    room_id: Uuid,
    user: &SessionUser,
    action: &str,
) -> Result<Room, BackendError> {
    let room = load_room(pool, room_id).await?;
    if !room.is_owned_by(user.user_id) {
        tracing::warn!("[Rooms] {} tried to {} in room {} they do not own", user.user_id, action, room_id);
        return Err(BackendError::forbidden(format!("Only the room owner can {}", action)));
    }
    Ok(room)
}

/// Load a room the caller may read
///
/// # Errors
/// * `404 Not Found` - unknown room
/// * `403 Forbidden` - private room and caller is neither owner nor member
pub(crate) async fn load_visible_room(
    pool: &SqlitePool,
    room_id: Uuid,
    user: &SessionUser,
) -> Result<Room, BackendError> {
    let room = load_room(pool, room_id).await?;
    if !db::can_view(pool, &room, user.user_id).await? {
        return Err(BackendError::forbidden("You are not a member of this room"));
    }
    Ok(room)
}

/// Create a room; the caller becomes its owner and first member
pub async fn create_room(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), BackendError> {
    user.require_account("create rooms")?;
    let name = request.validate()?;

    let room = Room {
        id: Uuid::new_v4(),
        name,
        topic: request.topic.as_deref().and_then(non_empty),
        emoji: request.emoji.as_deref().and_then(non_empty),
        is_private: request.is_private,
        max_members: request.max_members,
        owner_id: user.user_id,
        created_at: Utc::now(),
    };
    db::create_room(&pool, &room).await?;

    tracing::info!("[Rooms] {} created room {} ({})", user.user_id, room.id, room.name);
    Ok((StatusCode::CREATED, Json(room)))
}

/// Rooms visible to the caller
pub async fn list_rooms(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<RoomSummary>>, BackendError> {
    Ok(Json(db::list_visible_rooms(&pool, user.user_id).await?))
}

/// Get one room with its member count
pub async fn get_room(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<RoomSummary>, BackendError> {
    let room = load_visible_room(&pool, room_id, &user).await?;
    let member_count = db::member_count(&pool, room.id).await?;
    Ok(Json(RoomSummary { room, member_count }))
}

/// Update a room's name, topic, emoji, visibility or cap (owner only)
pub async fn update_room(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
    Json(request): Json<UpdateRoomRequest>,
) -> Result<Json<Room>, BackendError> {
    let room = load_owned_room(&pool, room_id, &user, "edit this room").await?;
    let updated = request.apply_to(&room)?;
    db::update_room(&pool, &updated).await?;

    tracing::info!("[Rooms] Room {} updated", room.id);
    Ok(Json(updated))
}

/// Delete a room and everything in it (owner only)
pub async fn delete_room(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, BackendError> {
    let room = load_owned_room(&pool, room_id, &user, "delete this room").await?;
    let deleted = db::delete_room(&pool, room.id).await?;

    tracing::info!("[Rooms] Room {} deleted by {}", room.id, user.user_id);
    Ok(Json(DeletedResponse { id: room.id, deleted }))
}

/// Join a room
///
/// The body is optional; when present it may carry an `invite_token`.
///
/// # Errors
/// * `404 Not Found` - unknown room
/// * `403 Forbidden` - private room without ownership or a usable invite
/// * `409 Conflict` - the room has reached its member cap
pub async fn join_room(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<JoinRoomResponse>, BackendError> {
    let request: JoinRoomRequest = if body.iter().all(u8::is_ascii_whitespace) {
        JoinRoomRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| BackendError::bad_request(format!("Invalid join body: {}", e)))?
    };

    let room = load_room(&pool, room_id).await?;

    let invite = match request.invite_token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) if room.is_private => get_invite_by_token(&pool, token).await?,
        _ => None,
    };

    match db::join_room(&pool, &room, user.user_id, invite.as_ref(), Utc::now()).await? {
        JoinOutcome::Joined { member_count } => {
            tracing::info!("[Rooms] {} joined room {} ({} members)", user.user_id, room.id, member_count);
            Ok(Json(JoinRoomResponse {
                room_id: room.id,
                newly_joined: true,
                member_count,
            }))
        }
        JoinOutcome::AlreadyMember { member_count } => Ok(Json(JoinRoomResponse {
            room_id: room.id,
            newly_joined: false,
            member_count,
        })),
        JoinOutcome::InviteRejected => {
            tracing::warn!("[Rooms] {} denied entry to private room {}", user.user_id, room.id);
            Err(BackendError::forbidden("A valid invite is required to join this private room"))
        }
        JoinOutcome::RoomFull => {
            tracing::info!("[Rooms] {} rejected, room {} is full", user.user_id, room.id);
            Err(BackendError::conflict("Room is full"))
        }
    }
}
