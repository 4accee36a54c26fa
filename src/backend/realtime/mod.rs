//! Real-time Change Feed
//!
//! Clients watching a room receive an event for every message inserted
//! into or deleted from it. Events are pushed over Server-Sent Events and
//! carry ids only; subscribers fetch full records through the REST API.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - Per-room broadcast channels (`RoomFeedHub`)
//! └── subscription.rs - SSE subscription handler
//! ```
//!
//! # Wire format
//!
//! ```text
//! event: insert
//! id: 6c1e...
//! data: {"event_type":"insert","room_id":"...","record_id":"...","actor_id":"...","timestamp":"..."}
//! ```

/// Per-room broadcast channels
pub mod broadcast;

/// Server-Sent Events subscription handler
pub mod subscription;

pub use broadcast::RoomFeedHub;
pub use subscription::subscribe_room;
