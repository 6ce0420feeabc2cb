//! # parley-entity
//!
//! Domain entity models shared by the directory, realtime and API crates.

pub mod message;
pub mod user;

pub use message::MessageDeletedNotice;
pub use user::{User, UserProfile};
