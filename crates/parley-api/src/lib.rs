//! # parley-api
//!
//! HTTP layer for Parley built on Axum: the `/ws` realtime endpoint,
//! health checks, CORS and error mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
