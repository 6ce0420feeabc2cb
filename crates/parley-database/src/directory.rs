//! User directory selection.

use std::sync::Arc;

use tracing::{info, warn};

use parley_core::config::DatabaseConfig;
use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_core::traits::UserDirectory;
use parley_entity::user::UserProfile;

use crate::connection::DatabasePool;
use crate::migration::run_migrations;
use crate::repositories::{MemoryUserDirectory, PgUserRepository};

/// Directory handle shared by the realtime engine and HTTP layer.
pub type SharedDirectory = Arc<dyn UserDirectory<UserProfile>>;

/// Build the user directory named by `database.provider`.
///
/// `postgres` connects (and migrates when configured); `memory` holds the
/// accounts listed in `database.seed_users` and is meant for tests and
/// local development.
pub async fn build_directory(config: &DatabaseConfig) -> AppResult<SharedDirectory> {
    match config.provider.as_str() {
        "postgres" => {
            let db = DatabasePool::connect(config).await?;
            if config.run_migrations {
                run_migrations(db.pool()).await?;
            }
            Ok(Arc::new(PgUserRepository::new(db.pool().clone())))
        }
        "memory" => {
            let directory = MemoryUserDirectory::with_profiles(
                config
                    .seed_users
                    .iter()
                    .map(|seed| UserProfile::new(seed.id.as_str(), seed.username.as_str())),
            );
            if directory.is_empty() {
                warn!("In-memory user directory has no seed users, every handshake will be refused");
            }
            info!(users = directory.len(), "Using in-memory user directory");
            Ok(Arc::new(directory))
        }
        other => Err(AppError::configuration(format!(
            "Unknown database provider: '{other}'. Supported: postgres, memory"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use parley_core::config::{AppConfig, SeedUserConfig};
    use parley_core::types::id::UserId;

    use super::*;

    #[tokio::test]
    async fn test_memory_provider() {
        let config = DatabaseConfig {
            provider: "memory".to_string(),
            ..DatabaseConfig::default()
        };
        assert!(build_directory(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_provider_loads_seed_users() {
        let config = DatabaseConfig {
            provider: "memory".to_string(),
            seed_users: vec![SeedUserConfig {
                id: "alice".to_string(),
                username: "Alice".to_string(),
            }],
            ..DatabaseConfig::default()
        };
        let directory = build_directory(&config).await.unwrap();

        let alice = directory.find_by_id(&UserId::new("alice")).await.unwrap();
        assert_eq!(alice.map(|p| p.username), Some("Alice".to_string()));
    }

    #[tokio::test]
    async fn test_development_profile_has_accounts() {
        let config = AppConfig::load("../../config", "development").unwrap();
        assert_eq!(config.database.provider, "memory");
        assert!(!config.database.seed_users.is_empty());

        let directory = build_directory(&config.database).await.unwrap();
        let seed = &config.database.seed_users[0];
        let found = directory.find_by_id(&UserId::new(seed.id.as_str())).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let config = DatabaseConfig {
            provider: "mongodb".to_string(),
            ..DatabaseConfig::default()
        };
        assert!(build_directory(&config).await.is_err());
    }
}
