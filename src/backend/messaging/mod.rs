//! Messaging Module
//!
//! Message persistence and the send, history and delete endpoints.
//!
//! # Module Structure
//!
//! ```text
//! messaging/
//! ├── mod.rs       - Module exports
//! ├── db.rs        - Message queries (single insert, atomic batch, paging)
//! └── handlers.rs  - HTTP handlers, change feed publishing
//! ```

pub mod db;
pub mod handlers;

pub use handlers::{delete_message, get_message, list_messages, send_batch, send_message};
