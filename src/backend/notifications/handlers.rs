//! Notification HTTP Handlers

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use sqlx::SqlitePool;

use super::db;
use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, Json};
use crate::backend::rooms::handlers::load_room;
use crate::shared::notification::{BulkNotificationRequest, BulkNotificationResponse};

/// Send one notification to each of several users
///
/// The caller is the sender. The caller, duplicate ids and unknown users
/// are skipped; the remaining rows are written atomically.
///
/// # Errors
/// * `400 Bad Request` - blank kind, no recipients or too many recipients
/// * `404 Not Found` - `room_id` names an unknown room
pub async fn dispatch_bulk(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Json(request): Json<BulkNotificationRequest>,
) -> Result<(StatusCode, Json<BulkNotificationResponse>), BackendError> {
    let recipients = request.recipients(user.user_id)?;
    if let Some(room_id) = request.room_id {
        load_room(&pool, room_id).await?;
    }

    let created = db::insert_bulk(
        &pool,
        user.user_id,
        &recipients,
        request.kind.trim(),
        request.room_id,
        request.message_id,
        Utc::now(),
    )
    .await?;

    tracing::info!(
        "[Notifications] {} dispatched {} '{}' notifications",
        user.user_id,
        created,
        request.kind.trim()
    );
    Ok((StatusCode::CREATED, Json(BulkNotificationResponse { created })))
}
