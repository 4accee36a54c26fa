//! Room invites
//!
//! Owners mint invite tokens for private rooms. A token is a 32-character
//! hex string; joins consume it (see [`super::db::join_room`]) and it turns
//! inactive once its uses run out, on explicit deactivation, or when the
//! maintenance sweep finds it expired.

use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, Json, Path};
use crate::backend::rooms::handlers::{load_owned_room, load_room};
use crate::shared::invite::{CreateInviteRequest, InvitePreview, RoomInvite};

#[derive(Debug, Clone, sqlx::FromRow)]
struct InviteRow {
    id: Uuid,
    room_id: Uuid,
    token: String,
    created_by: Uuid,
    expires_at: Option<DateTime<Utc>>,
    max_uses: Option<u32>,
    uses: u32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<InviteRow> for RoomInvite {
    fn from(row: InviteRow) -> Self {
        RoomInvite {
            id: row.id,
            room_id: row.room_id,
            token: row.token,
            created_by: row.created_by,
            expires_at: row.expires_at,
            max_uses: row.max_uses,
            uses: row.uses,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

const INVITE_COLUMNS: &str = "id, room_id, token, created_by, expires_at, max_uses, uses, is_active, created_at";

/// Generate a fresh invite token
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Insert a new invite
pub async fn insert_invite(
    pool: &SqlitePool,
    room_id: Uuid,
    created_by: Uuid,
    expires_at: Option<DateTime<Utc>>,
    max_uses: Option<u32>,
) -> Result<RoomInvite, sqlx::Error> {
    let invite = RoomInvite {
        id: Uuid::new_v4(),
        room_id,
        token: generate_token(),
        created_by,
        expires_at,
        max_uses,
        uses: 0,
        is_active: true,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO room_invites (id, room_id, token, created_by, expires_at, max_uses, uses, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, 0, 1, ?)
        "#,
    )
    .bind(invite.id)
    .bind(invite.room_id)
    .bind(&invite.token)
    .bind(invite.created_by)
    .bind(invite.expires_at)
    .bind(invite.max_uses)
    .bind(invite.created_at)
    .execute(pool)
    .await?;

    Ok(invite)
}

pub async fn get_invite_by_token(pool: &SqlitePool, token: &str) -> Result<Option<RoomInvite>, sqlx::Error> {
    let row = sqlx::query_as::<_, InviteRow>(&format!(
        "SELECT {} FROM room_invites WHERE token = ?",
        INVITE_COLUMNS
    ))
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(RoomInvite::from))
}

/// Invites of a room, newest first
pub async fn list_room_invites(pool: &SqlitePool, room_id: Uuid) -> Result<Vec<RoomInvite>, sqlx::Error> {
    let rows = sqlx::query_as::<_, InviteRow>(&format!(
        "SELECT {} FROM room_invites WHERE room_id = ? ORDER BY rowid DESC",
        INVITE_COLUMNS
    ))
    .bind(room_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(RoomInvite::from).collect())
}

/// Mark an invite inactive
///
/// # Returns
/// The updated invite, or `None` if it does not belong to the room
pub async fn deactivate_invite(
    pool: &SqlitePool,
    room_id: Uuid,
    invite_id: Uuid,
) -> Result<Option<RoomInvite>, sqlx::Error> {
    let row = sqlx::query_as::<_, InviteRow>(&format!(
        "UPDATE room_invites SET is_active = 0 WHERE id = ? AND room_id = ? RETURNING {}",
        INVITE_COLUMNS
    ))
    .bind(invite_id)
    .bind(room_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(RoomInvite::from))
}

/// Deactivate every active invite that is expired or exhausted at `now`
pub async fn deactivate_unusable(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let rows = sqlx::query_as::<_, InviteRow>(&format!(
        "SELECT {} FROM room_invites WHERE is_active = 1 AND (expires_at IS NOT NULL OR max_uses IS NOT NULL)",
        INVITE_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    let stale: Vec<Uuid> = rows
        .into_iter()
        .map(RoomInvite::from)
        .filter(|invite| !invite.is_usable(now))
        .map(|invite| invite.id)
        .collect();

    if stale.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut deactivated = 0;
    for id in &stale {
        deactivated += sqlx::query("UPDATE room_invites SET is_active = 0 WHERE id = ? AND is_active = 1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    tx.commit().await?;

    Ok(deactivated)
}

/// Create an invite for a room the caller owns
///
/// # Errors
/// * `404 Not Found` - unknown room
/// * `403 Forbidden` - caller is not the owner
/// * `400 Bad Request` - invalid expiry or use count
pub async fn create_invite(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
    Json(request): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<RoomInvite>), BackendError> {
    let room = load_owned_room(&pool, room_id, &user, "manage invites").await?;
    let expires_at = request.expires_at(Utc::now())?;

    let invite = insert_invite(&pool, room.id, user.user_id, expires_at, request.max_uses).await?;
    tracing::info!("[Invites] {} created invite {} for room {}", user.user_id, invite.id, room.id);

    Ok((StatusCode::CREATED, Json(invite)))
}

/// List a room's invites (owner only)
pub async fn list_invites(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Vec<RoomInvite>>, BackendError> {
    let room = load_owned_room(&pool, room_id, &user, "manage invites").await?;
    Ok(Json(list_room_invites(&pool, room.id).await?))
}

/// Deactivate one of a room's invites (owner only)
pub async fn deactivate(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path((room_id, invite_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RoomInvite>, BackendError> {
    let room = load_owned_room(&pool, room_id, &user, "manage invites").await?;
    let invite = deactivate_invite(&pool, room.id, invite_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Invite not found"))?;

    tracing::info!("[Invites] Invite {} deactivated", invite.id);
    Ok(Json(invite))
}

/// Look up an invite token without consuming it
pub async fn preview_invite(
    State(pool): State<SqlitePool>,
    AuthUser(_user): AuthUser,
    Path(token): Path<String>,
) -> Result<Json<InvitePreview>, BackendError> {
    let invite = get_invite_by_token(&pool, &token)
        .await?
        .ok_or_else(|| BackendError::not_found("Invite not found"))?;
    let room = load_room(&pool, invite.room_id).await?;

    Ok(Json(InvitePreview {
        room_id: room.id,
        room_name: room.name,
        room_emoji: room.emoji,
        usable: invite.is_usable(Utc::now()),
    }))
}
