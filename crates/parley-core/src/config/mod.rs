//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default so a missing file or
//! section still yields a runnable configuration.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod realtime;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, SeedUserConfig};
pub use self::logging::LoggingConfig;
pub use self::realtime::{PresenceMode, RealtimeConfig};
pub use self::store::{RedisStoreConfig, StoreConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay + `PARLEY__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// User directory backend settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Presence store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Credential verification settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Real-time WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files under `dir`.
    ///
    /// Merges `<dir>/default.toml` with the `<dir>/<env>.toml` overlay and
    /// environment variables prefixed with `PARLEY__`.
    pub fn load(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PARLEY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
