//! Message-related payloads that cross the REST/realtime boundary.

pub mod deletion;

pub use deletion::MessageDeletedNotice;
