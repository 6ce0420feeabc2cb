//! User lookup collaborator used for authentication and presence hydration.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::UserId;

/// Read-only access to user accounts.
///
/// Generic over the profile type so this crate stays free of entity
/// definitions; the realtime engine uses it with `UserProfile`.
#[async_trait]
pub trait UserDirectory<Profile>: Send + Sync + 'static
where
    Profile: Send + Sync + 'static,
{
    /// Find one user by id. `Ok(None)` means the account does not exist.
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<Profile>>;

    /// Find every existing user among `ids`. Unknown ids are skipped.
    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<Profile>>;
}
