//! Middleware Module
//!
//! Request extractors that run before handlers:
//!
//! - **`auth`** - session verification (`AuthUser`) and the cron secret
//!   guard (`CronGuard`)
//! - **`extract`** - `Json`, `Path`, `Query` and `Multipart` wrappers that
//!   reject with `BackendError`

pub mod auth;
pub mod extract;

pub use auth::{authenticate_token, bearer_token, AuthUser, CronGuard, SessionUser};
pub use extract::{Json, Multipart, Path, Query};
