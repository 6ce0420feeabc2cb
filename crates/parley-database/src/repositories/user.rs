//! PostgreSQL-backed user directory.

use async_trait::async_trait;
use sqlx::PgPool;

use parley_core::error::{AppError, ErrorKind};
use parley_core::result::AppResult;
use parley_core::traits::UserDirectory;
use parley_core::types::id::UserId;
use parley_entity::user::{User, UserProfile};

/// Read-only access to the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the full account row, including the password hash.
    pub async fn find_user(&self, id: &UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }
}

#[async_trait]
impl UserDirectory<UserProfile> for PgUserRepository {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<UserProfile>> {
        Ok(self.find_user(id).await?.map(UserProfile::from))
    }

    async fn find_many(&self, ids: &[UserId]) -> AppResult<Vec<UserProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = ANY($1) ORDER BY username",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load users", e))?;

        Ok(users.into_iter().map(UserProfile::from).collect())
    }
}
