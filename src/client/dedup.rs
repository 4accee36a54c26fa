//! Change-feed de-duplication.
//!
//! The feed can redeliver an insert (reconnects, or the sender's own
//! optimistic message arriving after reconciliation). The cache remembers
//! every message id the session has rendered.

use std::collections::HashSet;

use uuid::Uuid;

#[derive(Debug, Default, Clone)]
pub struct DedupCache {
    seen: HashSet<Uuid>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`; returns `false` if it was already seen
    pub fn observe(&mut self, id: Uuid) -> bool {
        self.seen.insert(id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.seen.contains(&id)
    }

    /// Forget `id` so a later delivery renders again
    pub fn forget(&mut self, id: Uuid) -> bool {
        self.seen.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
