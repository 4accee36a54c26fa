//! Backend Module
//!
//! The ChatBloom HTTP server: an axum API over SQLite, a per-room change
//! feed over Server-Sent Events, and a filesystem media store.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, state, initialization
//! - **`routes`** - Router assembly
//! - **`auth`** - Session token verification and profiles
//! - **`middleware`** - `AuthUser` and `CronGuard` extractors
//! - **`rooms`** - Rooms, membership, invites
//! - **`messaging`** - Message send, history and delete
//! - **`media`** - Uploads and the object store
//! - **`friends`** - Friend requests
//! - **`notifications`** - Bulk notification dispatch
//! - **`maintenance`** - Stale member and invite sweeps
//! - **`realtime`** - Change feed broadcasting and subscription
//! - **`error`** - `BackendError` and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs
//! ├── main.rs          - `chatbloom-server` binary
//! ├── server/
//! ├── routes/
//! ├── auth/
//! ├── middleware/
//! ├── rooms/
//! ├── messaging/
//! ├── media/
//! ├── friends/
//! ├── notifications/
//! ├── maintenance/
//! ├── realtime/
//! └── error/
//! ```
//!
//! # State Management
//!
//! Handlers share an `AppState` holding the SQLite pool, the loaded
//! configuration, the JWT keys, the `RoomFeedHub` and the `MediaStore`.
//! Sub-states are extracted through `FromRef`.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatbloom::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(config).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Session verification and profiles
pub mod auth;

/// Request extractors
pub mod middleware;

/// Rooms, membership and invites
pub mod rooms;

/// Message endpoints
pub mod messaging;

/// Media uploads
pub mod media;

/// Friend requests
pub mod friends;

/// Notification dispatch
pub mod notifications;

/// Scheduled cleanup
pub mod maintenance;

/// Real-time change feed
pub mod realtime;

pub use error::BackendError;
pub use realtime::RoomFeedHub;
pub use server::{create_app, AppState, ServerConfig};
