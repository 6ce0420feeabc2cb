//! Store used when no backend could be reached.

use async_trait::async_trait;

use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_core::traits::KeyValueStore;

/// A store that is never available. Every call fails with
/// `ServiceUnavailable`; callers are expected to check
/// [`KeyValueStore::is_available`] first and skip the call.
#[derive(Debug, Clone, Default)]
pub struct DisabledStore;

impl DisabledStore {
    fn unavailable<T>() -> AppResult<T> {
        Err(AppError::service_unavailable("Presence store is disabled"))
    }
}

#[async_trait]
impl KeyValueStore for DisabledStore {
    fn is_available(&self) -> bool {
        false
    }

    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Self::unavailable()
    }

    async fn set(&self, _key: &str, _value: &str) -> AppResult<()> {
        Self::unavailable()
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Self::unavailable()
    }

    async fn set_add(&self, _key: &str, _member: &str) -> AppResult<bool> {
        Self::unavailable()
    }

    async fn set_remove(&self, _key: &str, _member: &str) -> AppResult<bool> {
        Self::unavailable()
    }

    async fn set_contains(&self, _key: &str, _member: &str) -> AppResult<bool> {
        Self::unavailable()
    }

    async fn set_members(&self, _key: &str) -> AppResult<Vec<String>> {
        Self::unavailable()
    }

    async fn set_len(&self, _key: &str) -> AppResult<u64> {
        Self::unavailable()
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
}
