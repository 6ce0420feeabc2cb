//! User account entity and its public projection.

pub mod model;

pub use model::{User, UserProfile};
