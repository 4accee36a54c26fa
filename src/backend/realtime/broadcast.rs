/**
 * Room Change Broadcasting
 *
 * Each room gets its own `tokio::sync::broadcast` channel so subscribers
 * only receive changes for the room they watch. Channels are created on
 * first use and pruned by the maintenance task once nobody listens.
 */

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::ChangeEvent;

/// Buffered events per room before slow subscribers start lagging
const ROOM_CHANNEL_CAPACITY: usize = 256;

/// Per-room change channels
#[derive(Clone, Default)]
pub struct RoomFeedHub {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<ChangeEvent>>>>,
}

impl RoomFeedHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, broadcast::Sender<ChangeEvent>>> {
        // A poisoned map only means a panic mid-insert; the map itself is still valid.
        self.channels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Subscribe to a room, creating its channel if needed
    pub fn subscribe(&self, room_id: Uuid) -> broadcast::Receiver<ChangeEvent> {
        self.lock()
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish a change to the room's subscribers
    ///
    /// # Returns
    ///
    /// Number of subscribers that received the event (0 if none)
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let sender = self.lock().get(&event.room_id).cloned();
        match sender {
            Some(sender) => match sender.send(event) {
                Ok(subscriber_count) => {
                    tracing::debug!("[Realtime] Change delivered to {} subscribers", subscriber_count);
                    subscriber_count
                }
                Err(_) => 0,
            },
            None => 0,
        }
    }

    /// Drop channels without subscribers
    ///
    /// # Returns
    ///
    /// Number of channels removed
    pub fn prune_idle(&self) -> usize {
        let mut channels = self.lock();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    /// Current subscriber count of a room
    pub fn subscriber_count(&self, room_id: Uuid) -> usize {
        self.lock()
            .get(&room_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}
