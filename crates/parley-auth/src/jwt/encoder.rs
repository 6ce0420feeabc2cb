//! JWT token creation with configurable signing and TTL.

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use parley_core::config::AuthConfig;
use parley_core::error::{AppError, ErrorKind};
use parley_core::result::AppResult;
use parley_core::types::id::UserId;

use super::claims::Claims;

/// Creates signed bearer tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token lifetime.
    ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder").field("ttl", &self.ttl).finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: Duration::days(config.jwt_ttl_days as i64),
        }
    }

    /// Issues a token for `user_id` with the configured lifetime.
    pub fn issue(&self, user_id: &UserId) -> AppResult<String> {
        self.issue_with_ttl(user_id, self.ttl)
    }

    /// Issues a token with an explicit lifetime. A negative `ttl` yields a
    /// token that is already expired.
    pub fn issue_with_ttl(&self, user_id: &UserId, ttl: Duration) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to encode token", e)
        })
    }
}
