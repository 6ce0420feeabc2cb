//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Credential verification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime in days.
    #[serde(default = "default_ttl_days")]
    pub jwt_ttl_days: u64,
    /// Clock-skew leeway applied when checking expiry, in seconds.
    #[serde(default = "default_leeway")]
    pub jwt_leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_ttl_days: default_ttl_days(),
            jwt_leeway_seconds: default_leeway(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_ttl_days() -> u64 {
    30
}

fn default_leeway() -> u64 {
    5
}
