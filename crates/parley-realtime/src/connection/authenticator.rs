//! Connection authentication — validates the bearer token sent in the
//! handshake frame and resolves the account it names.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use parley_auth::jwt::JwtDecoder;
use parley_core::error::AppError;
use parley_core::traits::UserDirectory;
use parley_core::types::id::UserId;
use parley_entity::user::UserProfile;

/// First frame a client sends: `{ "token": "<jwt>" }`.
///
/// Socket.io-style clients nest the token under `auth`; both shapes are
/// accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Handshake {
    /// Bearer token.
    #[serde(default)]
    pub token: Option<String>,
    /// Nested credential block.
    #[serde(default)]
    auth: Option<HandshakeAuth>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct HandshakeAuth {
    #[serde(default)]
    token: Option<String>,
}

impl Handshake {
    /// Handshake carrying `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            auth: None,
        }
    }

    /// Parse a handshake frame. Anything unreadable counts as a frame
    /// without a token.
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|e| {
            debug!(error = %e, "Unreadable handshake frame");
            Self::default()
        })
    }

    /// The presented token, if non-empty.
    pub fn bearer(&self) -> Option<&str> {
        self.token
            .as_deref()
            .or_else(|| self.auth.as_ref().and_then(|a| a.token.as_deref()))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Why a handshake was refused. `Display` is the reason shown to the client.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// No token was presented.
    #[error("Auth token missing")]
    MissingToken,
    /// Signature or expiry check failed.
    #[error("Authentication failed")]
    InvalidToken(#[source] AppError),
    /// The token names an account that no longer exists.
    #[error("User not found")]
    UserNotFound(UserId),
    /// The user directory could not be queried.
    #[error("Authentication failed")]
    Lookup(#[source] AppError),
}

impl HandshakeError {
    /// Stable label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken(_) => "invalid_token",
            Self::UserNotFound(_) => "user_not_found",
            Self::Lookup(_) => "lookup_failed",
        }
    }
}

/// Authenticates connections using JWT tokens and the user directory.
#[derive(Clone)]
pub struct HandshakeAuthenticator {
    /// JWT decoder.
    decoder: Arc<JwtDecoder>,
    /// Account lookup.
    directory: Arc<dyn UserDirectory<UserProfile>>,
}

impl std::fmt::Debug for HandshakeAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandshakeAuthenticator").finish()
    }
}

impl HandshakeAuthenticator {
    /// Creates a new authenticator.
    pub fn new(decoder: Arc<JwtDecoder>, directory: Arc<dyn UserDirectory<UserProfile>>) -> Self {
        Self { decoder, directory }
    }

    /// Resolves the profile a handshake authenticates as.
    pub async fn authenticate(&self, handshake: &Handshake) -> Result<UserProfile, HandshakeError> {
        let token = handshake.bearer().ok_or(HandshakeError::MissingToken)?;

        let claims = self
            .decoder
            .decode(token)
            .map_err(HandshakeError::InvalidToken)?;

        match self.directory.find_by_id(&claims.id).await {
            Ok(Some(profile)) => Ok(profile),
            Ok(None) => Err(HandshakeError::UserNotFound(claims.id)),
            Err(e) => {
                warn!(user_id = %claims.id, error = %e, "User lookup failed during handshake");
                Err(HandshakeError::Lookup(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use parley_auth::jwt::JwtEncoder;
    use parley_core::config::AuthConfig;
    use parley_database::MemoryUserDirectory;

    use super::*;

    fn setup() -> (HandshakeAuthenticator, JwtEncoder, MemoryUserDirectory) {
        let config = AuthConfig::default();
        let directory = MemoryUserDirectory::with_profiles([UserProfile::new("a", "Alice")]);
        let authenticator = HandshakeAuthenticator::new(
            Arc::new(JwtDecoder::new(&config)),
            Arc::new(directory.clone()),
        );
        (authenticator, JwtEncoder::new(&config), directory)
    }

    #[test]
    fn test_parse_shapes() {
        assert_eq!(Handshake::parse(r#"{"token":"abc"}"#).bearer(), Some("abc"));
        assert_eq!(
            Handshake::parse(r#"{"auth":{"token":"xyz"}}"#).bearer(),
            Some("xyz")
        );
        assert_eq!(Handshake::parse(r#"{"token":"  "}"#).bearer(), None);
        assert_eq!(Handshake::parse("not json").bearer(), None);
    }

    #[tokio::test]
    async fn test_valid_token() {
        let (authenticator, encoder, _) = setup();
        let token = encoder.issue(&UserId::new("a")).unwrap();
        let profile = authenticator
            .authenticate(&Handshake::with_token(token))
            .await
            .unwrap();
        assert_eq!(profile.username, "Alice");
    }

    #[tokio::test]
    async fn test_missing_token() {
        let (authenticator, _, _) = setup();
        let err = authenticator
            .authenticate(&Handshake::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HandshakeError::MissingToken));
        assert_eq!(err.to_string(), "Auth token missing");
    }

    #[tokio::test]
    async fn test_expired_token() {
        let (authenticator, encoder, _) = setup();
        let token = encoder
            .issue_with_ttl(&UserId::new("a"), Duration::days(-1))
            .unwrap();
        let err = authenticator
            .authenticate(&Handshake::with_token(token))
            .await
            .unwrap_err();
        assert!(matches!(err, HandshakeError::InvalidToken(_)));
        assert_eq!(err.to_string(), "Authentication failed");
    }

    #[tokio::test]
    async fn test_deleted_user() {
        let (authenticator, encoder, directory) = setup();
        let token = encoder.issue(&UserId::new("a")).unwrap();
        directory.remove(&UserId::new("a"));
        let err = authenticator
            .authenticate(&Handshake::with_token(token))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User not found");
        assert_eq!(err.label(), "user_not_found");
    }
}
