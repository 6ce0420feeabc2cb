//! # parley-database
//!
//! PostgreSQL connection management and the user directory used by the
//! realtime handshake. An in-memory directory is provided for tests and
//! database-less development.

pub mod connection;
pub mod directory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use directory::{SharedDirectory, build_directory};
pub use repositories::{MemoryUserDirectory, PgUserRepository};
