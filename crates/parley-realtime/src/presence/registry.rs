//! Presence registry — which users are reachable and through which connection.
//!
//! Every method is fail-open: when the store is unavailable or a call
//! fails, the failure is logged and the method returns its safe default
//! (`None`, `false`, an empty list) instead of an error.

use std::sync::Arc;

use tracing::{debug, warn};

use parley_cache::keys;
use parley_core::config::PresenceMode;
use parley_core::traits::KeyValueStore;
use parley_core::types::id::UserId;

/// Tracks online users and their latest connection id.
#[derive(Debug, Clone)]
pub struct PresenceRegistry {
    /// Backing store.
    store: Arc<dyn KeyValueStore>,
    /// Single- or multi-connection bookkeeping.
    mode: PresenceMode,
}

impl PresenceRegistry {
    /// Creates a registry over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, mode: PresenceMode) -> Self {
        Self { store, mode }
    }

    /// Returns the configured presence mode.
    pub fn mode(&self) -> PresenceMode {
        self.mode
    }

    /// Whether the backing store is currently usable.
    pub fn is_available(&self) -> bool {
        self.store.is_available()
    }

    fn ready(&self, operation: &'static str) -> bool {
        let available = self.store.is_available();
        if !available {
            debug!(operation, "Presence store unavailable, skipping");
        }
        available
    }

    /// Records `connection_id` as the latest connection of `user_id` and
    /// adds the user to the online set. Empty ids are ignored.
    pub async fn mark_online(&self, user_id: &UserId, connection_id: &str) {
        if user_id.is_empty() || connection_id.trim().is_empty() {
            debug!(user_id = %user_id, "Ignoring mark_online with empty id");
            return;
        }
        if !self.ready("mark_online") {
            return;
        }

        if let Err(e) = self
            .store
            .set(&keys::user_connection(user_id), connection_id)
            .await
        {
            warn!(user_id = %user_id, error = %e, "Failed to record connection id");
        }

        if let Err(e) = self.store.set_add(&keys::online_users(), user_id.as_str()).await {
            warn!(user_id = %user_id, error = %e, "Failed to add user to online set");
        }

        if self.mode == PresenceMode::Multi {
            if let Err(e) = self
                .store
                .set_add(&keys::user_connections(user_id), connection_id)
                .await
            {
                warn!(user_id = %user_id, error = %e, "Failed to track live connection");
            }
        }
    }

    /// Removes the user's connection entry and drops it from the online set.
    pub async fn mark_offline(&self, user_id: &UserId) {
        if user_id.is_empty() || !self.ready("mark_offline") {
            return;
        }
        self.take_offline(user_id).await;
    }

    /// Clears every entry of the user. Returns whether this call removed the
    /// user from the online set; a failed removal counts as removed.
    async fn take_offline(&self, user_id: &UserId) -> bool {
        if let Err(e) = self.store.delete(&keys::user_connection(user_id)).await {
            warn!(user_id = %user_id, error = %e, "Failed to clear connection id");
        }

        let removed = match self
            .store
            .set_remove(&keys::online_users(), user_id.as_str())
            .await
        {
            Ok(removed) => removed,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to remove user from online set");
                true
            }
        };

        if self.mode == PresenceMode::Multi {
            if let Err(e) = self.store.delete(&keys::user_connections(user_id)).await {
                warn!(user_id = %user_id, error = %e, "Failed to clear live connections");
            }
        }

        removed
    }

    /// Releases one connection of a user and reports whether the user went
    /// offline as a result.
    ///
    /// In single mode this is `mark_offline` and always returns `true`. In
    /// multi mode the user stays online while any other connection is live,
    /// and when several connections close together only the release that
    /// removes the user from the online set returns `true`.
    pub async fn release_connection(&self, user_id: &UserId, connection_id: &str) -> bool {
        if self.mode == PresenceMode::Single || !self.ready("release_connection") {
            self.mark_offline(user_id).await;
            return true;
        }

        let connections_key = keys::user_connections(user_id);
        if let Err(e) = self.store.set_remove(&connections_key, connection_id).await {
            warn!(user_id = %user_id, error = %e, "Failed to release connection, marking offline");
            self.mark_offline(user_id).await;
            return true;
        }

        let remaining = match self.store.set_members(&connections_key).await {
            Ok(remaining) => remaining,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to read live connections, marking offline");
                self.mark_offline(user_id).await;
                return true;
            }
        };

        let Some(survivor) = remaining.first() else {
            return self.take_offline(user_id).await;
        };

        if self.connection_id(user_id).await.as_deref() == Some(connection_id) {
            if let Err(e) = self
                .store
                .set(&keys::user_connection(user_id), survivor)
                .await
            {
                warn!(user_id = %user_id, error = %e, "Failed to repoint connection id");
            }
        }

        debug!(
            user_id = %user_id,
            remaining = remaining.len(),
            "Connection released, user still online"
        );
        false
    }

    /// Latest connection id of the user, if any.
    pub async fn connection_id(&self, user_id: &UserId) -> Option<String> {
        if !self.ready("connection_id") {
            return None;
        }
        match self.store.get(&keys::user_connection(user_id)).await {
            Ok(value) => value,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to read connection id");
                None
            }
        }
    }

    /// Whether the user is in the online set.
    pub async fn is_online(&self, user_id: &UserId) -> bool {
        if !self.ready("is_online") {
            return false;
        }
        match self
            .store
            .set_contains(&keys::online_users(), user_id.as_str())
            .await
        {
            Ok(online) => online,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to check online status");
                false
            }
        }
    }

    /// Number of online users.
    pub async fn online_count(&self) -> usize {
        if !self.ready("online_count") {
            return 0;
        }
        match self.store.set_len(&keys::online_users()).await {
            Ok(count) => usize::try_from(count).unwrap_or(usize::MAX),
            Err(e) => {
                warn!(error = %e, "Failed to count online users");
                0
            }
        }
    }

    /// Every online user id, unordered.
    pub async fn list_online(&self) -> Vec<UserId> {
        if !self.ready("list_online") {
            return Vec::new();
        }
        match self.store.set_members(&keys::online_users()).await {
            Ok(members) => members.into_iter().map(UserId::from).collect(),
            Err(e) => {
                warn!(error = %e, "Failed to list online users");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use parley_cache::MemoryStore;

    use super::*;

    fn registry(mode: PresenceMode) -> (PresenceRegistry, MemoryStore) {
        let store = MemoryStore::new();
        (PresenceRegistry::new(Arc::new(store.clone()), mode), store)
    }

    #[tokio::test]
    async fn test_mark_online_records_connection() {
        let (presence, _) = registry(PresenceMode::Single);
        let alice = UserId::new("alice");

        presence.mark_online(&alice, "conn-1").await;

        assert!(presence.is_online(&alice).await);
        assert_eq!(presence.connection_id(&alice).await.as_deref(), Some("conn-1"));
        assert_eq!(presence.list_online().await, vec![alice]);
    }

    #[tokio::test]
    async fn test_mark_offline_clears_entry() {
        let (presence, _) = registry(PresenceMode::Single);
        let alice = UserId::new("alice");

        presence.mark_online(&alice, "conn-1").await;
        presence.mark_offline(&alice).await;

        assert!(!presence.is_online(&alice).await);
        assert!(presence.connection_id(&alice).await.is_none());
        assert!(presence.list_online().await.is_empty());
    }

    #[tokio::test]
    async fn test_reconnect_keeps_single_entry() {
        let (presence, _) = registry(PresenceMode::Single);
        let alice = UserId::new("alice");

        presence.mark_online(&alice, "conn-1").await;
        presence.mark_offline(&alice).await;
        presence.mark_online(&alice, "conn-2").await;
        presence.mark_online(&alice, "conn-3").await;

        assert_eq!(presence.connection_id(&alice).await.as_deref(), Some("conn-3"));
        assert_eq!(presence.list_online().await, vec![alice]);
    }

    #[tokio::test]
    async fn test_empty_ids_are_ignored() {
        let (presence, store) = registry(PresenceMode::Single);

        presence.mark_online(&UserId::new(""), "conn-1").await;
        presence.mark_online(&UserId::new("alice"), "  ").await;

        assert!(presence.list_online().await.is_empty());
        assert!(store.get("user:alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_store_returns_defaults() {
        let (presence, store) = registry(PresenceMode::Single);
        let alice = UserId::new("alice");
        store.set_available(false);

        presence.mark_online(&alice, "conn-1").await;
        assert!(!presence.is_online(&alice).await);
        assert!(presence.connection_id(&alice).await.is_none());
        assert!(presence.list_online().await.is_empty());
        presence.mark_offline(&alice).await;
        assert!(presence.release_connection(&alice, "conn-1").await);
    }

    #[tokio::test]
    async fn test_failing_store_returns_defaults() {
        let (presence, store) = registry(PresenceMode::Multi);
        let alice = UserId::new("alice");
        presence.mark_online(&alice, "conn-1").await;
        store.set_failing(true);

        assert!(!presence.is_online(&alice).await);
        assert!(presence.connection_id(&alice).await.is_none());
        assert!(presence.list_online().await.is_empty());
        assert!(presence.release_connection(&alice, "conn-1").await);
    }

    #[tokio::test]
    async fn test_single_mode_release_goes_offline() {
        let (presence, _) = registry(PresenceMode::Single);
        let alice = UserId::new("alice");

        presence.mark_online(&alice, "conn-1").await;
        presence.mark_online(&alice, "conn-2").await;

        assert!(presence.release_connection(&alice, "conn-1").await);
        assert!(!presence.is_online(&alice).await);
    }

    #[tokio::test]
    async fn test_multi_mode_stays_online_until_last_release() {
        let (presence, _) = registry(PresenceMode::Multi);
        let alice = UserId::new("alice");

        presence.mark_online(&alice, "conn-1").await;
        presence.mark_online(&alice, "conn-2").await;

        assert!(!presence.release_connection(&alice, "conn-2").await);
        assert!(presence.is_online(&alice).await);
        assert_eq!(presence.connection_id(&alice).await.as_deref(), Some("conn-1"));

        assert!(presence.release_connection(&alice, "conn-1").await);
        assert!(!presence.is_online(&alice).await);
        assert!(presence.connection_id(&alice).await.is_none());
    }

    #[tokio::test]
    async fn test_multi_mode_simultaneous_releases_go_offline_once() {
        let (presence, store) = registry(PresenceMode::Multi);
        let alice = UserId::new("alice");

        presence.mark_online(&alice, "conn-1").await;
        presence.mark_online(&alice, "conn-2").await;
        // conn-2's release has already dropped it from the live set.
        store
            .set_remove(&keys::user_connections(&alice), "conn-2")
            .await
            .unwrap();

        assert!(presence.release_connection(&alice, "conn-1").await);
        assert!(!presence.release_connection(&alice, "conn-2").await);
        assert!(!presence.is_online(&alice).await);
    }

    #[tokio::test]
    async fn test_online_count() {
        let (presence, store) = registry(PresenceMode::Single);

        presence.mark_online(&UserId::new("alice"), "conn-1").await;
        presence.mark_online(&UserId::new("bob"), "conn-2").await;
        presence.mark_online(&UserId::new("alice"), "conn-3").await;
        assert_eq!(presence.online_count().await, 2);

        store.set_failing(true);
        assert_eq!(presence.online_count().await, 0);
    }

    #[tokio::test]
    async fn test_multi_mode_release_of_older_keeps_latest() {
        let (presence, _) = registry(PresenceMode::Multi);
        let alice = UserId::new("alice");

        presence.mark_online(&alice, "conn-1").await;
        presence.mark_online(&alice, "conn-2").await;

        assert!(!presence.release_connection(&alice, "conn-1").await);
        assert_eq!(presence.connection_id(&alice).await.as_deref(), Some("conn-2"));
    }
}
