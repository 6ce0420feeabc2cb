//! # parley-realtime
//!
//! Real-time engine for Parley. Provides:
//!
//! - Handshake authentication (JWT + user directory lookup)
//! - Presence tracking in the shared key-value store, fail-open
//! - Identity and conversation groups with a pluggable join hook
//! - Fan-out of `receive_message`, `message_deleted`, `user_online`,
//!   `user_offline` and the `setup_online_users` snapshot
//!
//! Delivery is at-most-once: events queue on a bounded per-connection
//! buffer and are dropped for recipients that are full or gone.

pub mod connection;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod room;
pub mod server;

pub use connection::authenticator::{Handshake, HandshakeError};
pub use connection::manager::ConnectionManager;
pub use message::types::{InboundEvent, OutboundEvent};
pub use presence::registry::PresenceRegistry;
pub use room::{RoomAuthorizer, TrustedRoomAuthorizer};
pub use server::RealtimeEngine;
