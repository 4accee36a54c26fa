/**
 * Room Change Subscription Handler
 *
 * `GET /api/rooms/{id}/changes` streams the room's change feed as
 * Server-Sent Events. Browsers' `EventSource` cannot set headers, so the
 * session token may also be passed as `?access_token=`.
 *
 * # Connection Management
 *
 * - Keep-alive comments are injected while the room is quiet
 * - A lagging subscriber skips the events it missed and keeps streaming
 * - The stream ends when the room's channel closes
 */

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio_stream::Stream;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, Path};
use crate::backend::rooms::handlers::load_visible_room;
use crate::backend::server::state::AppState;
use crate::shared::ChangeEvent;

/// Subscribe to a room's change feed
///
/// # Errors
///
/// * `401 Unauthorized` - missing or invalid session
/// * `403 Forbidden` - private room the caller cannot see
/// * `404 Not Found` - unknown room
pub async fn subscribe_room(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, BackendError> {
    let room = load_visible_room(&state.pool, room_id, &user).await?;
    let rx = state.feed.subscribe(room.id);
    tracing::info!("[Realtime] {} subscribed to room {}", user.user_id, room.id);

    let stream = stream::unfold(rx, |mut rx: Receiver<ChangeEvent>| async move {
        loop {
            match rx.recv().await {
                Ok(change) => match to_sse_event(&change) {
                    Ok(event) => return Some((Ok(event), rx)),
                    Err(e) => {
                        tracing::error!("[Realtime] Failed to serialize change: {:?}", e);
                        continue;
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Subscriber lagged, skipped {} changes", skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("[Realtime] Room channel closed, ending stream");
                    return None;
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Render a change as an SSE event named after its type
pub fn to_sse_event(change: &ChangeEvent) -> Result<Event, serde_json::Error> {
    let data = serde_json::to_string(change)?;
    Ok(Event::default()
        .event(change.event_type.as_str())
        .id(change.record_id.to_string())
        .data(data))
}
