//! Collaborator traits defined in `parley-core` and implemented by other crates.

pub mod directory;
pub mod store;

pub use directory::UserDirectory;
pub use store::KeyValueStore;
