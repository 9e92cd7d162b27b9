//! Per-IP rate limiting over the store's counter and TTL primitives.
//!
//! Each client IP owns a bucket key (`rl:<ip>`). A check increments the
//! bucket and refreshes its window TTL in one pipelined batch, so no client
//! ever observes an incremented counter without an expiry. The bucket
//! disappears when its TTL elapses, which starts a fresh window.

use crate::domain::store::{KeyValueStore, StoreResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Key prefix for rate limit buckets. Short codes must never start with
/// this prefix (see [`crate::application::code_generator`]).
pub const BUCKET_PREFIX: &str = "rl:";

/// Outcome of a rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Bucket count after this check's increment.
    pub count: i64,
    /// Configured quota for the window.
    pub limit: i64,
    /// Time until the current window resets.
    pub reset: Duration,
}

impl RateLimitDecision {
    /// Quota left in the window. Goes negative once the caller is over
    /// quota, which tells them by how much.
    pub fn remaining(&self) -> i64 {
        self.limit - self.count
    }
}

/// Point-in-time view of a bucket, used for response assembly.
#[derive(Debug, Clone, Copy)]
pub struct BucketSnapshot {
    pub remaining: i64,
    pub reset: Duration,
}

/// Sliding window rate limiter backed by the key-value store.
///
/// Holds no counters of its own; every check round-trips to the store so
/// all replicas of the service share the same buckets.
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    quota: i64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, quota: i64, window: Duration) -> Self {
        Self {
            store,
            quota,
            window,
        }
    }

    fn bucket_key(client_id: &str) -> String {
        format!("{}{}", BUCKET_PREFIX, client_id)
    }

    /// Counts a request against `client_id`'s bucket and reports whether it
    /// is within quota.
    ///
    /// The increment and the window refresh run as one atomic batch. The TTL
    /// is then read back for the reset metadata; a missing or failed read
    /// reports a zero reset rather than failing the check.
    ///
    /// # Errors
    ///
    /// Returns the store error when the bucket update cannot be applied.
    /// Callers are expected to fail open: let the request through and attach
    /// no rate metadata.
    pub async fn check(&self, client_id: &str) -> StoreResult<RateLimitDecision> {
        let key = Self::bucket_key(client_id);

        let count = self.store.increment_and_expire(&key, self.window).await?;

        let reset = match self.store.ttl(&key).await {
            Ok(Some(ttl)) => ttl,
            Ok(None) => Duration::ZERO,
            Err(e) => {
                warn!(client = client_id, error = %e, "TTL read-back failed");
                Duration::ZERO
            }
        };

        Ok(RateLimitDecision {
            allowed: count <= self.quota,
            count,
            limit: self.quota,
            reset,
        })
    }

    /// Returns one count to `client_id`'s bucket.
    ///
    /// Issued after a confirmed write so the final persisted request is not
    /// counted twice. Best-effort: a failure is logged and swallowed, since
    /// the mapping was already durably created.
    pub async fn refund(&self, client_id: &str) {
        let key = Self::bucket_key(client_id);
        if let Err(e) = self.store.decrement(&key).await {
            warn!(client = client_id, error = %e, "rate bucket refund failed");
        }
    }

    /// Re-reads `client_id`'s bucket for response assembly.
    ///
    /// A failed read yields zero values rather than an error; a missing
    /// bucket reads as a full quota.
    pub async fn snapshot(&self, client_id: &str) -> BucketSnapshot {
        let key = Self::bucket_key(client_id);

        let remaining = match self.store.get(&key).await {
            Ok(Some(raw)) => raw
                .parse::<i64>()
                .map(|count| self.quota - count)
                .unwrap_or(0),
            Ok(None) => self.quota,
            Err(_) => 0,
        };

        let reset = match self.store.ttl(&key).await {
            Ok(Some(ttl)) => ttl,
            _ => Duration::ZERO,
        };

        BucketSnapshot { remaining, reset }
    }
}
