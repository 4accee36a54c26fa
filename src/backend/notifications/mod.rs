//! Notifications Module
//!
//! Bulk dispatch of user notifications. Notifications are only written
//! here; delivery to devices is handled elsewhere.

pub mod db;
pub mod handlers;

pub use handlers::dispatch_bulk;
