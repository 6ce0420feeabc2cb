//! Store manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use parley_core::config::StoreConfig;
use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_core::traits::KeyValueStore;

use crate::disabled::DisabledStore;

/// Store manager that wraps the configured key-value store.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store.
    inner: Arc<dyn KeyValueStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    ///
    /// An unreachable Redis is not fatal: the manager logs a warning and
    /// serves a [`DisabledStore`] so presence features switch off.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn KeyValueStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis presence store");
                match crate::redis::RedisClient::connect(&config.redis).await {
                    Ok(client) => Arc::new(crate::redis::RedisStore::new(client)),
                    Err(e) => {
                        warn!(error = %e, "Redis connection failed, presence features disabled");
                        Arc::new(DisabledStore)
                    }
                }
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory presence store");
                Arc::new(crate::memory::MemoryStore::new())
            }
            "disabled" => {
                info!("Presence store disabled by configuration");
                Arc::new(DisabledStore)
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: redis, memory, disabled"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing store (for testing).
    pub fn from_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self { inner: store }
    }
}

#[async_trait]
impl KeyValueStore for StoreManager {
    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.set_add(key, member).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.set_remove(key, member).await
    }

    async fn set_contains(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.set_contains(key, member).await
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        self.inner.set_members(key).await
    }

    async fn set_len(&self, key: &str) -> AppResult<u64> {
        self.inner.set_len(key).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
