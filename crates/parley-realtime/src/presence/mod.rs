//! Presence bookkeeping backed by the shared key-value store.

pub mod registry;

pub use registry::PresenceRegistry;
