//! Room transcript.
//!
//! The ordered list the room view renders. Outgoing messages appear at
//! once as `Pending` placeholders keyed by their temp id; the server copy
//! replaces the placeholder in place when it arrives, so order never
//! jumps. Failed sends remove their placeholders and leave a `System`
//! line instead.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::message::MessageWithAuthor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    /// Optimistic copy of an outgoing message
    Pending {
        temp_id: Uuid,
        content: String,
        queued_at: DateTime<Utc>,
    },
    /// Stored message
    Delivered(MessageWithAuthor),
    /// Local notice, never sent to the server
    System { text: String, at: DateTime<Utc> },
}

impl TranscriptEntry {
    /// Id of the stored message, if this entry has one
    pub fn message_id(&self) -> Option<Uuid> {
        match self {
            TranscriptEntry::Delivered(message) => Some(message.id()),
            _ => None,
        }
    }

    pub fn temp_id(&self) -> Option<Uuid> {
        match self {
            TranscriptEntry::Pending { temp_id, .. } => Some(*temp_id),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_message(&self, id: Uuid) -> bool {
        self.entries.iter().any(|entry| entry.message_id() == Some(id))
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.temp_id().is_some()).count()
    }

    pub fn push_pending(&mut self, temp_id: Uuid, content: impl Into<String>) {
        self.entries.push(TranscriptEntry::Pending {
            temp_id,
            content: content.into(),
            queued_at: Utc::now(),
        });
    }

    /// Replace the placeholder for `temp_id` with the stored message
    ///
    /// If the stored message already arrived through the change feed, the
    /// placeholder is dropped instead. Returns `false` when no placeholder
    /// matched.
    pub fn reconcile(&mut self, temp_id: Uuid, message: MessageWithAuthor) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.temp_id() == Some(temp_id)) else {
            return false;
        };
        if self.contains_message(message.id()) {
            self.entries.remove(index);
        } else {
            self.entries[index] = TranscriptEntry::Delivered(message);
        }
        true
    }

    /// Remove the placeholders of a failed send
    ///
    /// # Returns
    ///
    /// Number of placeholders removed
    pub fn rollback(&mut self, temp_ids: &[Uuid]) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| entry.temp_id().map_or(true, |id| !temp_ids.contains(&id)));
        before - self.entries.len()
    }

    pub fn push_system(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::System {
            text: text.into(),
            at: Utc::now(),
        });
    }

    /// Append a message received from another client
    ///
    /// Returns `false` if the message is already shown.
    pub fn append_remote(&mut self, message: MessageWithAuthor) -> bool {
        if self.contains_message(message.id()) {
            return false;
        }
        self.entries.push(TranscriptEntry::Delivered(message));
        true
    }

    /// Insert a page of history ahead of everything shown so far
    ///
    /// Messages already present are skipped. Returns the number inserted.
    pub fn prepend_history(&mut self, history: Vec<MessageWithAuthor>) -> usize {
        let fresh: Vec<TranscriptEntry> = history
            .into_iter()
            .filter(|message| !self.contains_message(message.id()))
            .map(TranscriptEntry::Delivered)
            .collect();
        let inserted = fresh.len();
        self.entries.splice(0..0, fresh);
        inserted
    }

    pub fn remove_message(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.message_id() != Some(id));
        before != self.entries.len()
    }
}
