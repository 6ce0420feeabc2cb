//! # parley-core
//!
//! Core crate for Parley. Contains the configuration schema, typed
//! identifiers, the collaborator traits implemented by the store and
//! database crates, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Parley crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
