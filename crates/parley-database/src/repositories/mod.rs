//! User directory implementations.

pub mod memory;
pub mod user;

pub use memory::MemoryUserDirectory;
pub use user::PgUserRepository;
