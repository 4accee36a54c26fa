//! Outgoing message routing.
//!
//! A message typed while nothing is queued and no message went out in the
//! last [`IMMEDIATE_WINDOW`] is sent on its own. Anything faster joins the
//! queue, and every queued message pushes the flush deadline to
//! [`FLUSH_DELAY`] after itself, so a burst leaves as one batch once the
//! user pauses.
//!
//! The queue is a plain state machine over caller-supplied instants; the
//! room session owns the timer.

use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

/// Minimum spacing between two immediate sends
pub const IMMEDIATE_WINDOW: Duration = Duration::from_millis(150);

/// Quiet period after the last queued message before the batch flushes
pub const FLUSH_DELAY: Duration = Duration::from_millis(180);

/// A message waiting to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub temp_id: Uuid,
    pub content: String,
}

impl OutgoingMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            temp_id: Uuid::new_v4(),
            content: content.into(),
        }
    }
}

/// Where a new message should go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Send now as a single message
    Immediate(OutgoingMessage),
    /// Queued; flush the batch at `flush_at`
    Queued { flush_at: Instant },
}

#[derive(Debug, Default)]
pub struct SendQueue {
    queue: Vec<OutgoingMessage>,
    last_immediate_at: Option<Instant>,
    flush_at: Option<Instant>,
}

impl SendQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a message typed at `now`
    pub fn route(&mut self, message: OutgoingMessage, now: Instant) -> Route {
        let recently_sent = self
            .last_immediate_at
            .is_some_and(|at| now.saturating_duration_since(at) < IMMEDIATE_WINDOW);

        if self.queue.is_empty() && !recently_sent {
            self.last_immediate_at = Some(now);
            return Route::Immediate(message);
        }

        self.queue.push(message);
        let flush_at = now + FLUSH_DELAY;
        self.flush_at = Some(flush_at);
        Route::Queued { flush_at }
    }

    /// Take every queued message, leaving the queue empty
    pub fn drain(&mut self) -> Vec<OutgoingMessage> {
        self.flush_at = None;
        std::mem::take(&mut self.queue)
    }

    /// Current flush deadline, if anything is queued
    pub fn flush_deadline(&self) -> Option<Instant> {
        self.flush_at
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
