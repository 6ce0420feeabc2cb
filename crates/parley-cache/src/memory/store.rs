//! In-memory key-value store using `dashmap`.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_core::traits::KeyValueStore;

/// In-memory store. Cloning shares the underlying maps.
///
/// Outages can be simulated with [`MemoryStore::set_available`] (the
/// store reports itself as down) and [`MemoryStore::set_failing`] (the
/// store claims to be up but every command errors).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Plain string values.
    values: Arc<DashMap<String, String>>,
    /// Set values.
    sets: Arc<DashMap<String, HashSet<String>>>,
    /// Outage flag reported through `is_available`.
    down: Arc<AtomicBool>,
    /// Outage flag that only shows up as command errors.
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the store as reachable or not.
    pub fn set_available(&self, available: bool) {
        self.down.store(!available, Ordering::SeqCst);
    }

    /// Make every command fail while still reporting the store as available.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.down.load(Ordering::SeqCst) || self.failing.load(Ordering::SeqCst) {
            return Err(AppError::store("In-memory store is unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn is_available(&self) -> bool {
        !self.down.load(Ordering::SeqCst)
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.check()?;
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.check()?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.check()?;
        self.values.remove(key);
        self.sets.remove(key);
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool> {
        self.check()?;
        Ok(self
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool> {
        self.check()?;
        let removed = match self.sets.get_mut(key) {
            Some(mut members) => members.remove(member),
            None => false,
        };
        // Redis drops empty sets; mirror that.
        self.sets.remove_if(key, |_, members| members.is_empty());
        Ok(removed)
    }

    async fn set_contains(&self, key: &str, member: &str) -> AppResult<bool> {
        self.check()?;
        Ok(self
            .sets
            .get(key)
            .map(|members| members.contains(member))
            .unwrap_or(false))
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        self.check()?;
        Ok(self
            .sets
            .get(key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn set_len(&self, key: &str) -> AppResult<u64> {
        self.check()?;
        Ok(self
            .sets
            .get(key)
            .map(|members| members.len() as u64)
            .unwrap_or(0))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.check().is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();
        store.set("user:a", "conn-1").await.unwrap();
        assert_eq!(store.get("user:a").await.unwrap(), Some("conn-1".into()));

        store.set("user:a", "conn-2").await.unwrap();
        assert_eq!(store.get("user:a").await.unwrap(), Some("conn-2".into()));

        store.delete("user:a").await.unwrap();
        assert_eq!(store.get("user:a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_membership_is_idempotent() {
        let store = MemoryStore::new();
        assert!(store.set_add("online", "a").await.unwrap());
        assert!(!store.set_add("online", "a").await.unwrap());
        assert_eq!(store.set_len("online").await.unwrap(), 1);

        assert!(store.set_remove("online", "a").await.unwrap());
        assert!(!store.set_remove("online", "a").await.unwrap());
        assert!(store.set_members("online").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outage_modes() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(!store.is_available());
        assert!(store.get("k").await.is_err());

        store.set_available(true);
        store.set_failing(true);
        assert!(store.is_available());
        assert!(store.set_add("s", "m").await.is_err());
        assert!(!store.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set_add("online", "a").await.unwrap();
        assert!(other.set_contains("online", "a").await.unwrap());
    }
}
