//! Key-value store contract and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store operation error: {0}")]
    Operation(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Contract over the external key-value store.
///
/// Implementations must be thread-safe and usable from any number of
/// concurrent request tasks; the store's own primitives provide per-key
/// atomicity, so no locking is required on the caller side.
///
/// # Implementations
///
/// - [`crate::infrastructure::redis_store::RedisStore`] - Redis-backed production store
/// - [`crate::infrastructure::memory_store::MemoryStore`] - In-process store for tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieves the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key does not exist or its TTL has elapsed.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key` with the given time-to-live.
    ///
    /// An existing value under the same key is replaced along with its TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Atomically increments the integer counter under `key` by one.
    ///
    /// A missing key is created with count 1 and no TTL. Returns the count
    /// after incrementing.
    async fn increment(&self, key: &str) -> StoreResult<i64>;

    /// Atomically decrements the integer counter under `key` by one.
    ///
    /// Returns the count after decrementing.
    async fn decrement(&self, key: &str) -> StoreResult<i64>;

    /// Reports the remaining time-to-live of `key`.
    ///
    /// Returns `Ok(None)` when the key is missing or has no expiry.
    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>>;

    /// Sets or refreshes the time-to-live of `key`.
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()>;

    /// Increments the counter under `key` and refreshes its TTL in one
    /// pipelined batch.
    ///
    /// The store must apply both commands as a unit: no other client's
    /// commands on the same key may land between the increment and the TTL
    /// refresh, so a counter is never observable without an expiry.
    /// Returns the count after incrementing.
    async fn increment_and_expire(&self, key: &str, ttl: Duration) -> StoreResult<i64>;

    /// Checks whether the store is reachable.
    async fn ping(&self) -> bool;
}
