//! Redis store implementation.

use async_trait::async_trait;
use redis::AsyncCommands;

use parley_core::error::{AppError, ErrorKind};
use parley_core::result::AppResult;
use parley_core::traits::KeyValueStore;

use super::client::RedisClient;

/// Redis-backed presence store.
#[derive(Debug, Clone)]
pub struct RedisStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisStore {
    /// Create a new Redis store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Store, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.set(&full_key, value).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let added: i64 = conn.sadd(&full_key, member).await.map_err(Self::map_err)?;
        Ok(added > 0)
    }

    async fn set_remove(&self, key: &str, member: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let removed: i64 = conn.srem(&full_key, member).await.map_err(Self::map_err)?;
        Ok(removed > 0)
    }

    async fn set_contains(&self, key: &str, member: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: bool = conn
            .sismember(&full_key, member)
            .await
            .map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let members: Vec<String> = conn.smembers(&full_key).await.map_err(Self::map_err)?;
        Ok(members)
    }

    async fn set_len(&self, key: &str) -> AppResult<u64> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let len: u64 = conn.scard(&full_key).await.map_err(Self::map_err)?;
        Ok(len)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
