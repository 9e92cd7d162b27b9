//! In-process store implementation for the test suite.

use crate::domain::store::{KeyValueStore, StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// A [`KeyValueStore`] backed by a process-local map.
///
/// Used by tests that need real store semantics (TTL expiry, counter
/// arithmetic, per-key atomicity) without a Redis instance. All operations
/// run under one mutex, which also makes the pipelined counter update atomic.
///
/// # Test Controls
///
/// - [`MemoryStore::force_expire`] - ages a key out immediately, as if its
///   TTL had elapsed
/// - [`MemoryStore::fail_all`] - every operation reports a connection error
/// - [`MemoryStore::fail_counters`] - only counter operations fail, leaving
///   reads and writes working (simulates the rate limiter losing the store
///   while persistence is still up)
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    fail_all: AtomicBool,
    fail_counters: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with a connection error.
    pub fn fail_all(&self, on: bool) {
        self.fail_all.store(on, Ordering::SeqCst);
    }

    /// Makes counter operations (increment, decrement, TTL, expire) fail
    /// while get/set keep working.
    pub fn fail_counters(&self, on: bool) {
        self.fail_counters.store(on, Ordering::SeqCst);
    }

    /// Expires `key` immediately, as if its TTL had elapsed.
    pub fn force_expire(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
    }

    /// Returns the current integer value of a counter key, if present.
    pub fn counter_value(&self, key: &str) -> Option<i64> {
        let mut entries = self.entries.lock().unwrap();
        Self::live(&mut entries, key).and_then(|e| e.value.parse().ok())
    }

    fn unavailable() -> StoreError {
        StoreError::Connection("store unavailable".to_string())
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(())
    }

    fn check_counters_available(&self) -> StoreResult<()> {
        self.check_available()?;
        if self.fail_counters.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(())
    }

    /// Looks up a key, dropping it first if its TTL has elapsed.
    fn live<'a>(entries: &'a mut HashMap<String, Entry>, key: &str) -> Option<&'a mut Entry> {
        if entries.get(key).is_some_and(Entry::is_expired) {
            entries.remove(key);
        }
        entries.get_mut(key)
    }

    fn bump(
        entries: &mut HashMap<String, Entry>,
        key: &str,
        delta: i64,
        ttl: Option<Duration>,
    ) -> StoreResult<i64> {
        let count = match Self::live(entries, key) {
            Some(entry) => {
                let current: i64 = entry.value.parse().map_err(|_| {
                    StoreError::Operation(format!("value under '{}' is not an integer", key))
                })?;
                let next = current + delta;
                entry.value = next.to_string();
                if let Some(ttl) = ttl {
                    entry.expires_at = Some(Instant::now() + ttl);
                }
                next
            }
            None => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: delta.to_string(),
                        expires_at: ttl.map(|t| Instant::now() + t),
                    },
                );
                delta
            }
        };
        Ok(count)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        Ok(Self::live(&mut entries, key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn increment(&self, key: &str) -> StoreResult<i64> {
        self.check_counters_available()?;
        let mut entries = self.entries.lock().unwrap();
        Self::bump(&mut entries, key, 1, None)
    }

    async fn decrement(&self, key: &str) -> StoreResult<i64> {
        self.check_counters_available()?;
        let mut entries = self.entries.lock().unwrap();
        Self::bump(&mut entries, key, -1, None)
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        self.check_counters_available()?;
        let mut entries = self.entries.lock().unwrap();
        Ok(Self::live(&mut entries, key)
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(Instant::now())))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        self.check_counters_available()?;
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = Self::live(&mut entries, key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn increment_and_expire(&self, key: &str, ttl: Duration) -> StoreResult<i64> {
        self.check_counters_available()?;
        // One lock hold covers both steps, mirroring the store-side pipeline.
        let mut entries = self.entries.lock().unwrap();
        Self::bump(&mut entries, key, 1, Some(ttl))
    }

    async fn ping(&self) -> bool {
        !self.fail_all.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get_roundtrip() {
        let store = MemoryStore::new();
        store
            .set("abc123", "https://example.com/", Duration::from_secs(60))
            .await
            .unwrap();

        let value = store.get("abc123").await.unwrap();
        assert_eq!(value.as_deref(), Some("https://example.com/"));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_forced_expiry_removes_key() {
        let store = MemoryStore::new();
        store
            .set("gone", "https://example.com/", Duration::from_secs(60))
            .await
            .unwrap();

        store.force_expire("gone");
        assert_eq!(store.get("gone").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let store = MemoryStore::new();
        store
            .set("flash", "https://example.com/", Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(store.get("flash").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_increment_creates_and_counts() {
        let store = MemoryStore::new();
        assert_eq!(store.increment("counter").await.unwrap(), 1);
        assert_eq!(store.increment("counter").await.unwrap(), 2);
        assert_eq!(store.decrement("counter").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expire_refreshes_ttl() {
        let store = MemoryStore::new();
        store
            .set("abc123", "https://example.com/", Duration::from_secs(10))
            .await
            .unwrap();

        store
            .expire("abc123", Duration::from_secs(600))
            .await
            .unwrap();

        let ttl = store.ttl("abc123").await.unwrap().unwrap();
        assert!(ttl > Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_increment_and_expire_sets_ttl() {
        let store = MemoryStore::new();
        let count = store
            .increment_and_expire("rl:10.0.0.1", Duration::from_secs(1800))
            .await
            .unwrap();
        assert_eq!(count, 1);

        let ttl = store.ttl("rl:10.0.0.1").await.unwrap();
        assert!(ttl.is_some_and(|t| t > Duration::from_secs(1700)));
    }

    #[tokio::test]
    async fn test_fail_all_rejects_everything() {
        let store = MemoryStore::new();
        store.fail_all(true);

        assert!(store.get("x").await.is_err());
        assert!(store.set("x", "y", Duration::from_secs(1)).await.is_err());
        assert!(store.increment("x").await.is_err());
        assert!(!store.ping().await);

        store.fail_all(false);
        assert!(store.get("x").await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_counters_leaves_reads_and_writes_working() {
        let store = MemoryStore::new();
        store.fail_counters(true);

        assert!(store.increment("c").await.is_err());
        assert!(
            store
                .increment_and_expire("c", Duration::from_secs(1))
                .await
                .is_err()
        );
        assert!(store.get("x").await.is_ok());
        assert!(store.set("x", "y", Duration::from_secs(1)).await.is_ok());
    }
}
