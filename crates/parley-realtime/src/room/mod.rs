//! Conversation groups: named broadcast scopes that connections join.
//!
//! Identity groups (named by a user id) and conversation groups (named by
//! a chat id) share one namespace.

pub mod authorizer;
pub mod registry;
pub mod subscription;

pub use authorizer::{RoomAuthorizer, TrustedRoomAuthorizer};
pub use registry::RoomRegistry;
