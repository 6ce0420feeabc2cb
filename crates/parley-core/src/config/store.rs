//! Presence store configuration.

use serde::{Deserialize, Serialize};

/// Top-level presence store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store provider: `"redis"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Redis-specific settings.
    #[serde(default)]
    pub redis: RedisStoreConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            redis: RedisStoreConfig::default(),
        }
    }
}

/// Redis store backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisStoreConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for all Parley keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Number of reconnect attempts before a command gives up.
    #[serde(default = "default_reconnect_retries")]
    pub reconnect_retries: usize,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
            reconnect_retries: default_reconnect_retries(),
        }
    }
}

fn default_provider() -> String {
    "redis".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "parley:".to_string()
}

fn default_reconnect_retries() -> usize {
    5
}
