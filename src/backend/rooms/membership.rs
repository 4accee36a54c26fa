//! Membership lifecycle handlers
//!
//! Clients refresh their membership with a heartbeat while a room is open
//! and remove it when they leave. Page unloads cannot await a response or
//! set headers, so the beacon variant takes the session token in the body.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::db;
use super::handlers::load_visible_room;
use crate::backend::error::BackendError;
use crate::backend::middleware::{authenticate_token, bearer_token, AuthUser, Json, Path};
use crate::backend::server::state::AppState;
use crate::shared::room::{LeaveBeaconRequest, MembershipResponse, RoomMember};

/// Refresh the caller's liveness timestamp
///
/// # Errors
/// * `404 Not Found` - caller is not a member (e.g. swept as stale)
pub async fn heartbeat(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<MembershipResponse>, BackendError> {
    if !db::touch_member(&pool, room_id, user.user_id, Utc::now()).await? {
        return Err(BackendError::not_found("Not a member of this room"));
    }
    tracing::debug!("[Members] Heartbeat from {} in {}", user.user_id, room_id);
    Ok(Json(MembershipResponse {
        room_id,
        is_member: true,
    }))
}

/// Leave a room; succeeds even when already gone
pub async fn leave(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<MembershipResponse>, BackendError> {
    let removed = db::remove_member(&pool, room_id, user.user_id).await?;
    if removed {
        tracing::info!("[Members] {} left room {}", user.user_id, room_id);
    }
    Ok(Json(MembershipResponse {
        room_id,
        is_member: false,
    }))
}

/// Unload-time leave
///
/// Accepts the session token as `{"access_token": "..."}` in a body of any
/// content type, falling back to the `Authorization` header.
pub async fn leave_beacon(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, BackendError> {
    let token = match serde_json::from_slice::<LeaveBeaconRequest>(&body) {
        Ok(request) => request.access_token,
        Err(_) => bearer_token(&headers)
            .map(str::to_string)
            .ok_or_else(|| BackendError::unauthorized("Authentication required"))?,
    };

    let user = authenticate_token(&state, &token).await?;
    if db::remove_member(&state.pool, room_id, user.user_id).await? {
        tracing::info!("[Members] {} left room {} via beacon", user.user_id, room_id);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Members of a room the caller may read
pub async fn list_members(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<RoomMember>>, BackendError> {
    let room = load_visible_room(&pool, room_id, &user).await?;
    Ok(Json(db::list_members(&pool, room.id).await?))
}
