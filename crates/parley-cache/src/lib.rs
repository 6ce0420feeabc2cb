//! # parley-cache
//!
//! Key-value store providers backing presence state. Supports:
//!
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate
//! - **memory**: in-process store on top of `dashmap`, used for tests and
//!   single-process development
//!
//! The provider is selected at runtime based on configuration. When Redis
//! cannot be reached at startup the manager falls back to a disabled store
//! so presence degrades instead of blocking the server.

pub mod disabled;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use disabled::DisabledStore;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use provider::StoreManager;
