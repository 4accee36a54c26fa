//! Room Session
//!
//! Everything the room view does while a room is open:
//!
//! 1. `open` joins the room, starts the heartbeat and loads history in
//!    the background
//! 2. `send` shows an optimistic placeholder, then sends it alone or
//!    queues it for the next debounced batch
//! 3. `handle_change` renders inserts and deletes from the change feed,
//!    skipping ids already shown
//! 4. `close` flushes the queue, stops background work and leaves;
//!    `close_on_unload` fires the leave beacon instead
//!
//! Failed sends are never retried. Their placeholders are removed and a
//! system line tells the user what happened.

use std::sync::Arc;

use chrono::Utc;
use tokio::{sync::Mutex, task::JoinHandle, time::Instant};
use uuid::Uuid;

use super::api::ChatApi;
use super::dedup::DedupCache;
use super::error::ApiError;
use super::membership::Membership;
use super::send_queue::{OutgoingMessage, Route, SendQueue};
use super::transcript::Transcript;
use crate::shared::message::{BatchItem, ListMessagesQuery, SendBatchRequest, SendMessageRequest, MAX_BATCH_ITEMS};
use crate::shared::room::JoinRoomResponse;
use crate::shared::{ChangeEvent, ChangeType};

/// Shown when a guest is refused
pub const ACCOUNT_REQUIRED_NOTICE: &str = "You need to create an account to send messages.";

/// Shown for any other failed send
pub const SEND_FAILED_NOTICE: &str = "Message failed to send. Please try again.";

#[derive(Debug, Default)]
struct SessionState {
    queue: SendQueue,
    dedup: DedupCache,
    transcript: Transcript,
}

type SharedState = Arc<Mutex<SessionState>>;

/// An open room
pub struct RoomSession {
    api: ChatApi,
    room_id: Uuid,
    joined: JoinRoomResponse,
    state: SharedState,
    membership: Membership,
    history: Option<JoinHandle<()>>,
    flush_timer: Option<JoinHandle<()>>,
}

impl RoomSession {
    /// Join `room_id` and start the session
    ///
    /// # Errors
    ///
    /// The join failure, e.g. 403 for a private room without a usable
    /// invite or 409 for a full room.
    pub async fn open(api: ChatApi, room_id: Uuid, invite_token: Option<&str>) -> Result<Self, ApiError> {
        let (membership, joined) = Membership::join(&api, room_id, invite_token).await?;
        let state: SharedState = Arc::default();

        let history = tokio::spawn(load_history(api.clone(), state.clone(), room_id));

        Ok(Self {
            api,
            room_id,
            joined,
            state,
            membership,
            history: Some(history),
            flush_timer: None,
        })
    }

    pub fn room_id(&self) -> Uuid {
        self.room_id
    }

    /// Join result returned by the server
    pub fn joined(&self) -> &JoinRoomResponse {
        &self.joined
    }

    /// Snapshot of the transcript
    pub async fn transcript(&self) -> Transcript {
        self.state.lock().await.transcript.clone()
    }

    /// Wait for the initial history fetch to finish
    pub async fn history_loaded(&mut self) {
        if let Some(history) = self.history.take() {
            if let Err(e) = history.await {
                if !e.is_cancelled() {
                    tracing::warn!("[Session] History task failed: {}", e);
                }
            }
        }
    }

    /// Send a text message
    ///
    /// Returns the temp id of the placeholder, or `None` for blank input.
    pub async fn send(&mut self, content: &str) -> Option<Uuid> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        let outgoing = OutgoingMessage::new(content);
        let temp_id = outgoing.temp_id;
        let route = {
            let mut state = self.state.lock().await;
            state.transcript.push_pending(temp_id, content);
            state.queue.route(outgoing, Instant::now())
        };

        match route {
            Route::Immediate(message) => send_single(&self.api, &self.state, self.room_id, message).await,
            Route::Queued { .. } => self.arm_flush_timer(),
        }
        Some(temp_id)
    }

    /// Send everything queued now instead of waiting for the debounce
    pub async fn flush(&mut self) {
        flush_queue(&self.api, &self.state, self.room_id).await;
        // A timer caught mid-flush finishes its own batch; an idle one sees no deadline and exits.
        if let Some(timer) = self.flush_timer.take() {
            if let Err(e) = timer.await {
                tracing::warn!("[Session] Flush timer failed: {}", e);
            }
        }
    }

    /// Apply one change-feed event
    ///
    /// Returns `true` if the transcript changed.
    pub async fn handle_change(&self, event: &ChangeEvent) -> Result<bool, ApiError> {
        if event.room_id != self.room_id {
            return Ok(false);
        }

        match event.event_type {
            ChangeType::Insert => {
                if !self.state.lock().await.dedup.observe(event.record_id) {
                    tracing::debug!("[Session] Skipping already rendered message {}", event.record_id);
                    return Ok(false);
                }
                match self.api.get_message(event.record_id).await {
                    Ok(message) => Ok(self.state.lock().await.transcript.append_remote(message)),
                    Err(e) => {
                        self.state.lock().await.dedup.forget(event.record_id);
                        Err(e)
                    }
                }
            }
            ChangeType::Delete => Ok(self.state.lock().await.transcript.remove_message(event.record_id)),
        }
    }

    /// Flush, stop background work and leave the room
    pub async fn close(mut self) -> Result<(), ApiError> {
        self.flush().await;
        self.stop_tasks();
        self.membership.leave(&self.api).await
    }

    /// Page-unload variant of `close`: fires the leave beacon without awaiting it
    pub fn close_on_unload(mut self) -> JoinHandle<()> {
        self.stop_tasks();
        self.membership.leave_on_unload(&self.api)
    }

    fn stop_tasks(&mut self) {
        if let Some(history) = self.history.take() {
            history.abort();
        }
        if let Some(timer) = self.flush_timer.take() {
            timer.abort();
        }
    }

    /// Make sure a timer is waiting for the queue's flush deadline
    ///
    /// A running timer re-reads the deadline after each sleep, so pushing
    /// the deadline back needs no new task.
    fn arm_flush_timer(&mut self) {
        if self.flush_timer.as_ref().is_some_and(|timer| !timer.is_finished()) {
            return;
        }
        let api = self.api.clone();
        let state = self.state.clone();
        let room_id = self.room_id;
        self.flush_timer = Some(tokio::spawn(async move {
            loop {
                let deadline = state.lock().await.queue.flush_deadline();
                match deadline {
                    None => return,
                    Some(at) if Instant::now() >= at => break,
                    Some(at) => tokio::time::sleep_until(at).await,
                }
            }
            flush_queue(&api, &state, room_id).await;
        }));
    }
}

async fn load_history(api: ChatApi, state: SharedState, room_id: Uuid) {
    match api.list_messages(room_id, &ListMessagesQuery::default()).await {
        Ok(history) => {
            let mut state = state.lock().await;
            for message in &history {
                state.dedup.observe(message.id());
            }
            let inserted = state.transcript.prepend_history(history);
            tracing::debug!("[Session] Loaded {} history messages for {}", inserted, room_id);
        }
        Err(e) => tracing::warn!("[Session] Failed to load history for {}: {}", room_id, e),
    }
}

async fn send_single(api: &ChatApi, state: &SharedState, room_id: Uuid, message: OutgoingMessage) {
    let request = SendMessageRequest {
        room_id,
        content: message.content,
        temp_id: Some(message.temp_id),
        client_sent_at: Some(Utc::now()),
        ..Default::default()
    };

    match api.send_message(&request).await {
        Ok(response) => {
            let mut state = state.lock().await;
            state.dedup.observe(response.message.id());
            state.transcript.reconcile(message.temp_id, response.message);
        }
        Err(e) => fail_send(state, &[message.temp_id], &e).await,
    }
}

async fn flush_queue(api: &ChatApi, state: &SharedState, room_id: Uuid) {
    let queued = state.lock().await.queue.drain();
    if queued.is_empty() {
        return;
    }

    for chunk in queued.chunks(MAX_BATCH_ITEMS) {
        let temp_ids: Vec<Uuid> = chunk.iter().map(|m| m.temp_id).collect();
        let request = SendBatchRequest {
            room_id,
            items: chunk
                .iter()
                .map(|m| BatchItem {
                    temp_id: m.temp_id,
                    content: m.content.clone(),
                    media_url: None,
                    media_type: None,
                })
                .collect(),
        };

        match api.send_batch(&request).await {
            Ok(response) => {
                let mut state = state.lock().await;
                for result in response.results {
                    state.dedup.observe(result.message.id());
                    state.transcript.reconcile(result.temp_id, result.message);
                }
                tracing::debug!("[Session] Flushed batch of {} to {}", temp_ids.len(), room_id);
            }
            Err(e) => fail_send(state, &temp_ids, &e).await,
        }
    }
}

async fn fail_send(state: &SharedState, temp_ids: &[Uuid], error: &ApiError) {
    tracing::warn!("[Session] Send of {} message(s) failed: {}", temp_ids.len(), error);
    let notice = if error.requires_account() {
        ACCOUNT_REQUIRED_NOTICE
    } else {
        SEND_FAILED_NOTICE
    };
    let mut state = state.lock().await;
    state.transcript.rollback(temp_ids);
    state.transcript.push_system(notice);
}
