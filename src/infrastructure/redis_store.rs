//! Redis-backed store implementation.

use crate::domain::store::{KeyValueStore, StoreError, StoreResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::info;

/// Redis implementation of the [`KeyValueStore`] contract.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection
/// reuse across request tasks. The pipelined counter update runs as a
/// MULTI/EXEC transaction so the increment and TTL refresh apply as a unit.
pub struct RedisStore {
    client: ConnectionManager,
}

impl RedisStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid, the
    /// connection cannot be established, or the PING health check fails.
    pub async fn connect(redis_url: &str) -> StoreResult<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StoreError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self { client: manager })
    }

    fn op_err(op: &str, e: redis::RedisError) -> StoreError {
        StoreError::Operation(format!("{} failed: {}", op, e))
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.client.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| Self::op_err("GET", e))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.client.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs())
            .await
            .map_err(|e| Self::op_err("SETEX", e))
    }

    async fn increment(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.client.clone();
        conn.incr::<_, _, i64>(key, 1)
            .await
            .map_err(|e| Self::op_err("INCR", e))
    }

    async fn decrement(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.client.clone();
        conn.decr::<_, _, i64>(key, 1)
            .await
            .map_err(|e| Self::op_err("DECR", e))
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let mut conn = self.client.clone();
        let secs = conn
            .ttl::<_, i64>(key)
            .await
            .map_err(|e| Self::op_err("TTL", e))?;

        // Redis reports -2 for a missing key and -1 for a key without expiry.
        if secs < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(secs as u64)))
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.client.clone();
        conn.expire::<_, ()>(key, ttl.as_secs() as i64)
            .await
            .map_err(|e| Self::op_err("EXPIRE", e))
    }

    async fn increment_and_expire(&self, key: &str, ttl: Duration) -> StoreResult<i64> {
        let mut conn = self.client.clone();
        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, ttl.as_secs() as i64)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| Self::op_err("INCR/EXPIRE pipeline", e))?;

        Ok(count)
    }

    async fn ping(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
