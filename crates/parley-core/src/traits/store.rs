//! Key-value store trait backing presence state.

use async_trait::async_trait;

use crate::result::AppResult;

/// Minimal key-value + set store used by the presence registry.
///
/// Every method is a single atomic primitive of the underlying store;
/// there is no multi-key transaction. Implementations apply their own
/// key prefixing.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Cheap readiness probe. A store that reports `false` is skipped
    /// entirely by callers instead of being queried.
    fn is_available(&self) -> bool {
        true
    }

    /// Get a string value by key.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a string value (no expiry).
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Delete a key.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Add a member to a set. Returns `true` if it was not present.
    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Remove a member from a set. Returns `true` if it was present.
    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Check set membership.
    async fn set_contains(&self, key: &str, member: &str) -> AppResult<bool>;

    /// Return all members of a set, unordered.
    async fn set_members(&self, key: &str) -> AppResult<Vec<String>>;

    /// Return the cardinality of a set.
    async fn set_len(&self, key: &str) -> AppResult<u64>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
