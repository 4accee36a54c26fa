//! Client Module
//!
//! The logic behind a room chat view, written against the ChatBloom HTTP
//! API with `reqwest`. Nothing here renders; a UI drives `RoomSession` and
//! draws its `Transcript`.
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs          - Module exports
//! ├── config.rs       - Server URL and batch compression switch
//! ├── error.rs        - ApiError
//! ├── api.rs          - One method per endpoint
//! ├── compression.rs  - Gzip JSON bodies
//! ├── send_queue.rs   - Immediate vs. batched routing with debounce
//! ├── dedup.rs        - Rendered message ids
//! ├── transcript.rs   - Optimistic transcript
//! ├── membership.rs   - Join, heartbeat, leave, beacon
//! ├── feed.rs         - SSE change feed reader
//! └── session.rs      - RoomSession orchestration
//! ```
//!
//! # Typical loop
//!
//! ```rust,no_run
//! use chatbloom::client::{ChangeFeed, ChatApi, ClientConfig, RoomSession};
//!
//! # async fn example(room_id: uuid::Uuid) -> Result<(), chatbloom::client::ApiError> {
//! let api = ChatApi::new(ClientConfig::from_env(), "session-token");
//! let mut feed = ChangeFeed::connect(&api, room_id).await?;
//! let session = RoomSession::open(api, room_id, None).await?;
//! while let Some(change) = feed.recv().await {
//!     session.handle_change(&change).await?;
//! }
//! session.close().await
//! # }
//! ```

pub mod api;
pub mod compression;
pub mod config;
pub mod dedup;
pub mod error;
pub mod feed;
pub mod membership;
pub mod send_queue;
pub mod session;
pub mod transcript;

pub use api::ChatApi;
pub use compression::gzip_json;
pub use config::ClientConfig;
pub use dedup::DedupCache;
pub use error::ApiError;
pub use feed::ChangeFeed;
pub use membership::Membership;
pub use send_queue::{OutgoingMessage, Route, SendQueue};
pub use session::RoomSession;
pub use transcript::{Transcript, TranscriptEntry};
