//! Authentication Module
//!
//! Session verification and the profile store. Sign-up and login happen at
//! the external auth provider; this server only verifies the bearer tokens
//! it issues and keeps a profile row per identity.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs       - Module exports and documentation
//! ├── sessions.rs  - JWT verification (and minting for tests/tooling)
//! └── profiles.rs  - Profile upsert and lookup
//! ```

/// JWT session tokens
pub mod sessions;

/// Profile store
pub mod profiles;

pub use profiles::{get_profile, upsert_profile};
pub use sessions::{create_token, verify_token, Claims, JwtKeys};
