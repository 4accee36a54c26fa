/**
 * API Routes
 *
 * Every JSON endpoint under `/api`, grouped by resource.
 *
 * # Routes
 *
 * ## Rooms
 * - `POST /api/rooms`, `GET /api/rooms`
 * - `GET|PATCH|DELETE /api/rooms/{room_id}`
 * - `POST /api/rooms/{room_id}/join|heartbeat|leave|leave-beacon`
 * - `GET /api/rooms/{room_id}/members`
 * - `GET /api/rooms/{room_id}/changes` (SSE)
 *
 * ## Invites
 * - `POST|GET /api/rooms/{room_id}/invites`
 * - `DELETE /api/rooms/{room_id}/invites/{invite_id}`
 * - `GET /api/invites/{token}`
 *
 * ## Messages and media
 * - `POST /api/messages`, `POST /api/messages/batch` (gzip accepted)
 * - `GET /api/rooms/{room_id}/messages`
 * - `GET|DELETE /api/messages/{message_id}`
 * - `POST /api/media` (multipart)
 *
 * ## Friends and notifications
 * - `POST|GET /api/friends`, `DELETE /api/friends/{friendship_id}`
 * - `POST /api/friends/{friendship_id}/accept|decline`
 * - `POST /api/notifications/bulk`
 *
 * ## Maintenance (cron secret)
 * - `POST /api/maintenance/cleanup-members|cleanup-invites`
 */

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::decompression::RequestDecompressionLayer;

use crate::backend::friends;
use crate::backend::maintenance;
use crate::backend::media::handlers::upload_media;
use crate::backend::messaging;
use crate::backend::notifications;
use crate::backend::realtime::subscribe_room;
use crate::backend::rooms::{handlers as rooms, invites, membership};
use crate::backend::server::state::AppState;

/// Room, membership, invite and change-feed routes
fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/api/rooms", post(rooms::create_room).get(rooms::list_rooms))
        .route(
            "/api/rooms/{room_id}",
            get(rooms::get_room).patch(rooms::update_room).delete(rooms::delete_room),
        )
        .route("/api/rooms/{room_id}/join", post(rooms::join_room))
        .route("/api/rooms/{room_id}/heartbeat", post(membership::heartbeat))
        .route("/api/rooms/{room_id}/leave", post(membership::leave))
        .route("/api/rooms/{room_id}/leave-beacon", post(membership::leave_beacon))
        .route("/api/rooms/{room_id}/members", get(membership::list_members))
        .route("/api/rooms/{room_id}/messages", get(messaging::list_messages))
        .route("/api/rooms/{room_id}/changes", get(subscribe_room))
        .route(
            "/api/rooms/{room_id}/invites",
            post(invites::create_invite).get(invites::list_invites),
        )
        .route("/api/rooms/{room_id}/invites/{invite_id}", delete(invites::deactivate))
        .route("/api/invites/{token}", get(invites::preview_invite))
}

/// Message and media routes
///
/// The batch route inflates gzip bodies; the upload route raises the body
/// limit to the configured upload cap plus room for multipart framing.
fn message_routes(max_upload_bytes: usize) -> Router<AppState> {
    const MULTIPART_OVERHEAD: usize = 64 * 1024;

    Router::new()
        .route("/api/messages", post(messaging::send_message))
        .route(
            "/api/messages/batch",
            post(messaging::send_batch).layer(RequestDecompressionLayer::new()),
        )
        .route(
            "/api/messages/{message_id}",
            get(messaging::get_message).delete(messaging::delete_message),
        )
        .route(
            "/api/media",
            post(upload_media).layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD)),
        )
}

fn social_routes() -> Router<AppState> {
    Router::new()
        .route("/api/friends", post(friends::add_friend).get(friends::list_friends))
        .route("/api/friends/{friendship_id}", delete(friends::remove_friend))
        .route("/api/friends/{friendship_id}/accept", post(friends::accept_friend))
        .route("/api/friends/{friendship_id}/decline", post(friends::decline_friend))
        .route("/api/notifications/bulk", post(notifications::dispatch_bulk))
}

fn maintenance_routes() -> Router<AppState> {
    Router::new()
        .route("/api/maintenance/cleanup-members", post(maintenance::cleanup_members))
        .route("/api/maintenance/cleanup-invites", post(maintenance::cleanup_invites))
}

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
/// * `max_upload_bytes` - Largest accepted media file
pub fn configure_api_routes(router: Router<AppState>, max_upload_bytes: usize) -> Router<AppState> {
    router
        .merge(room_routes())
        .merge(message_routes(max_upload_bytes))
        .merge(social_routes())
        .merge(maintenance_routes())
}
