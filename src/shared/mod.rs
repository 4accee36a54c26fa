//! Shared Module
//!
//! Types and data structures shared between the server and the client
//! library. Everything here is plain serde data plus request validation, so
//! both sides agree on the wire format and reject the same bad input.

/// Room, membership and join payloads
pub mod room;

/// Messages and send/fetch payloads
pub mod message;

/// Room invites
pub mod invite;

/// Friendships
pub mod friendship;

/// Notifications
pub mod notification;

/// User profiles
pub mod profile;

/// Media upload payloads
pub mod media;

/// Real-time change events
pub mod event;

/// Shared error types
pub mod error;

pub use error::SharedError;
pub use event::{ChangeEvent, ChangeType};
pub use friendship::{Friendship, FriendshipStatus};
pub use invite::RoomInvite;
pub use message::{MediaType, Message, MessageDraft, MessageWithAuthor};
pub use notification::Notification;
pub use profile::Profile;
pub use room::{Room, RoomMember, RoomSummary};
