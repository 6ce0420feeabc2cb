//! WebSocket connection lifecycle and management.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod pool;
