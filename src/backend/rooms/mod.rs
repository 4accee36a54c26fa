//! Rooms Module
//!
//! Rooms, membership and invites.
//!
//! # Module Structure
//!
//! ```text
//! rooms/
//! ├── mod.rs         - Module exports and documentation
//! ├── db.rs          - Room and membership queries, transactional join
//! ├── handlers.rs    - Room CRUD and join handlers, access helpers
//! ├── membership.rs  - Heartbeat, leave, beacon leave, member list
//! └── invites.rs     - Invite queries and handlers
//! ```
//!
//! # Access rules
//!
//! - Guests cannot create rooms
//! - Only the owner may update or delete a room or manage its invites
//! - Private rooms are readable by their owner and members only, and
//!   joinable by the owner or with a usable invite
//! - A join fails with 409 once the member count reaches `max_members`

/// Room and membership queries
pub mod db;

/// Room CRUD and join handlers
pub mod handlers;

/// Membership lifecycle handlers
pub mod membership;

/// Invite store and handlers
pub mod invites;

pub use db::JoinOutcome;
