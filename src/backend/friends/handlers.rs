//! Friend HTTP Handlers
//!
//! Every mutation requires a registered account. Requests go from the
//! requester to the addressee; only the addressee may accept or decline,
//! while either party may remove the row.

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::db;
use crate::backend::auth::profiles::get_profile;
use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, Json, Path, SessionUser};
use crate::shared::friendship::{AddFriendRequest, FriendList, Friendship, FriendshipStatus};
use crate::shared::message::DeletedResponse;

const MANAGE_FRIENDS: &str = "manage friends";

async fn load_friendship(pool: &SqlitePool, id: Uuid) -> Result<Friendship, BackendError> {
    db::get_friendship(pool, id)
        .await?
        .ok_or_else(|| BackendError::not_found("Friend request not found"))
}

/// Load a pending request addressed to the caller
async fn load_incoming(pool: &SqlitePool, id: Uuid, user: &SessionUser) -> Result<Friendship, BackendError> {
    let friendship = load_friendship(pool, id).await?;
    if friendship.addressee_id != user.user_id {
        return Err(BackendError::forbidden("Only the recipient can respond to this request"));
    }
    if friendship.status != FriendshipStatus::Pending {
        return Err(BackendError::conflict("Friend request is no longer pending"));
    }
    Ok(friendship)
}

/// Send a friend request
///
/// # Errors
/// * `400 Bad Request` - caller targets themselves
/// * `403 Forbidden` - caller is a guest
/// * `404 Not Found` - unknown user
/// * `409 Conflict` - a request or friendship already exists in either direction
pub async fn add_friend(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Json(request): Json<AddFriendRequest>,
) -> Result<(StatusCode, Json<Friendship>), BackendError> {
    user.require_account(MANAGE_FRIENDS)?;

    if request.user_id == user.user_id {
        return Err(BackendError::bad_request("You cannot add yourself as a friend"));
    }
    if get_profile(&pool, request.user_id).await?.is_none() {
        return Err(BackendError::not_found("User not found"));
    }
    if let Some(existing) = db::find_between(&pool, user.user_id, request.user_id).await? {
        let message = match existing.status {
            FriendshipStatus::Accepted => "You are already friends",
            FriendshipStatus::Pending => "A friend request already exists",
        };
        return Err(BackendError::conflict(message));
    }

    let friendship = match db::insert_friendship(&pool, user.user_id, request.user_id).await {
        Ok(friendship) => friendship,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(BackendError::conflict("A friend request already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("[Friends] {} sent a request to {}", user.user_id, request.user_id);
    Ok((StatusCode::CREATED, Json(friendship)))
}

/// Accept a pending request addressed to the caller
pub async fn accept_friend(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(friendship_id): Path<Uuid>,
) -> Result<Json<Friendship>, BackendError> {
    user.require_account(MANAGE_FRIENDS)?;
    load_incoming(&pool, friendship_id, &user).await?;

    let accepted = db::accept_friendship(&pool, friendship_id, Utc::now())
        .await?
        .ok_or_else(|| BackendError::conflict("Friend request is no longer pending"))?;

    tracing::info!("[Friends] {} accepted request {}", user.user_id, friendship_id);
    Ok(Json(accepted))
}

/// Decline a pending request addressed to the caller
pub async fn decline_friend(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(friendship_id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, BackendError> {
    user.require_account(MANAGE_FRIENDS)?;
    load_incoming(&pool, friendship_id, &user).await?;

    let deleted = db::delete_friendship(&pool, friendship_id).await?;
    tracing::info!("[Friends] {} declined request {}", user.user_id, friendship_id);
    Ok(Json(DeletedResponse {
        id: friendship_id,
        deleted,
    }))
}

/// Cancel an outgoing request or remove a friend
pub async fn remove_friend(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(friendship_id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, BackendError> {
    user.require_account(MANAGE_FRIENDS)?;
    let friendship = load_friendship(&pool, friendship_id).await?;
    if !friendship.involves(user.user_id) {
        return Err(BackendError::forbidden("You are not part of this friendship"));
    }

    let deleted = db::delete_friendship(&pool, friendship_id).await?;
    tracing::info!(
        "[Friends] {} removed friendship with {}",
        user.user_id,
        friendship.other_party(user.user_id)
    );
    Ok(Json(DeletedResponse {
        id: friendship_id,
        deleted,
    }))
}

/// The caller's friends and pending requests
pub async fn list_friends(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<FriendList>, BackendError> {
    Ok(Json(db::list_friends(&pool, user.user_id).await?))
}
