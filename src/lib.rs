//! ChatBloom - Main Library
//!
//! ChatBloom is a room-based chat service: users join public or
//! invite-only rooms, exchange text, image and audio messages in near real
//! time, manage friends and send notifications.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between server and client
//!   - Rooms, messages, invites, friendships, notifications, profiles
//!   - Change-feed events
//!   - Request validation and error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP API over SQLite
//!   - Per-room change feed over Server-Sent Events
//!   - Media uploads served from a local object store
//!   - Scheduled cleanup of stale members and invites
//!
//! - **`client`** - Room chat view logic over `reqwest`
//!   - Send queue with batching and gzip compression
//!   - Optimistic transcript with reconciliation and rollback
//!   - Change-feed dedup and the membership lifecycle
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the `backend` module and the
//!   `chatbloom-server` binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use chatbloom::client::{ChatApi, ClientConfig, RoomSession};
//!
//! # async fn example(room_id: uuid::Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let api = ChatApi::new(ClientConfig::from_env(), "session-token");
//! let mut session = RoomSession::open(api, room_id, None).await?;
//! session.send("hello").await;
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Room chat client
pub mod client;
