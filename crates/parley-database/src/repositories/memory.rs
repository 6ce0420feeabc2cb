//! In-process user directory for tests and database-less development.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use parley_core::result::AppResult;
use parley_core::traits::UserDirectory;
use parley_core::types::id::UserId;
use parley_entity::user::UserProfile;

/// User directory held in a concurrent map. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    users: Arc<DashMap<UserId, UserProfile>>,
}

impl MemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory pre-populated with `profiles`.
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let directory = Self::new();
        for profile in profiles {
            directory.insert(profile);
        }
        directory
    }

    /// Insert or replace a profile.
    pub fn insert(&self, profile: UserProfile) {
        self.users.insert(profile.id.clone(), profile);
    }

    /// Remove a profile, simulating a deleted account.
    pub fn remove(&self, id: &UserId) -> Option<UserProfile> {
        self.users.remove(id).map(|(_, profile)| profile)
    }

    /// Number of known accounts.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory<UserProfile> for MemoryUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<UserProfile>> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<UserProfile>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|entry| entry.value().clone()))
            .collect())
    }
}
