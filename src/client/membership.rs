//! Room membership lifecycle.
//!
//! Joining starts a heartbeat loop that keeps the membership fresh while
//! the room is open. Server-side sweeps remove members whose heartbeats
//! stop, so a crashed client disappears on its own.

use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use super::api::ChatApi;
use super::error::ApiError;
use crate::shared::room::JoinRoomResponse;

/// Time between two heartbeats
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// An active membership with its heartbeat loop
#[derive(Debug)]
pub struct Membership {
    room_id: Uuid,
    heartbeat: JoinHandle<()>,
}

impl Membership {
    /// Join `room_id` and start heartbeating
    pub async fn join(
        api: &ChatApi,
        room_id: Uuid,
        invite_token: Option<&str>,
    ) -> Result<(Self, JoinRoomResponse), ApiError> {
        Self::join_with_interval(api, room_id, invite_token, HEARTBEAT_INTERVAL).await
    }

    pub async fn join_with_interval(
        api: &ChatApi,
        room_id: Uuid,
        invite_token: Option<&str>,
        interval: Duration,
    ) -> Result<(Self, JoinRoomResponse), ApiError> {
        let joined = api.join_room(room_id, invite_token).await?;
        tracing::info!(
            "[Membership] Joined room {} ({} members)",
            room_id,
            joined.member_count
        );

        let heartbeat = tokio::spawn(heartbeat_loop(api.clone(), room_id, interval));
        Ok((Self { room_id, heartbeat }, joined))
    }

    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    /// Stop heartbeating without telling the server
    pub fn stop(&self) {
        self.heartbeat.abort();
    }

    /// Stop heartbeating and leave explicitly
    pub async fn leave(self, api: &ChatApi) -> Result<(), ApiError> {
        self.stop();
        api.leave_room(self.room_id).await?;
        tracing::info!("[Membership] Left room {}", self.room_id);
        Ok(())
    }

    /// Stop heartbeating and fire the unload beacon without awaiting it
    pub fn leave_on_unload(self, api: &ChatApi) -> JoinHandle<()> {
        self.stop();
        let api = api.clone();
        let room_id = self.room_id;
        tokio::spawn(async move {
            if let Err(e) = api.leave_beacon(room_id).await {
                tracing::debug!("[Membership] Leave beacon for {} failed: {}", room_id, e);
            }
        })
    }
}

impl Drop for Membership {
    fn drop(&mut self) {
        self.heartbeat.abort();
    }
}

async fn heartbeat_loop(api: ChatApi, room_id: Uuid, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The join itself counts as the first beat.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        match api.heartbeat(room_id).await {
            Ok(_) => tracing::debug!("[Membership] Heartbeat sent for {}", room_id),
            Err(e) if e.status() == Some(404) => {
                tracing::warn!("[Membership] No longer a member of {}, stopping heartbeat", room_id);
                return;
            }
            Err(e) => tracing::warn!("[Membership] Heartbeat for {} failed: {}", room_id, e),
        }
    }
}
