//! # parley-auth
//!
//! Credential handling for Parley. Tokens are HS256 JWTs carrying the
//! user id in the `id` claim. The realtime handshake only decodes them;
//! the encoder exists for the REST login flow and for tests.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
