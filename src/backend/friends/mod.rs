//! Friends Module
//!
//! Friend requests and the friend list.
//!
//! # Lifecycle
//!
//! ```text
//! add_friend ──> pending ──accept──> accepted
//!                   │                   │
//!        decline / cancel            remove
//!                   └──────> deleted <──┘
//! ```

pub mod db;
pub mod handlers;

pub use handlers::{accept_friend, add_friend, decline_friend, list_friends, remove_friend};
