//! In-memory expiring cache.
//!
//! Entries are never evicted proactively. A read past the ttl simply misses,
//! and the next [`get_or_compute`] overwrites the stale entry. Overwriting is
//! always safe, so concurrent misses on the same key may both compute.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

/// Key-value store with per-read freshness checks.
///
/// Callers only depend on this trait, so a distributed store can replace
/// [`ExpiringCache`] without touching them.
pub trait CacheStore<V>: Send + Sync {
    /// Returns the value under `key` if it was stored less than `ttl` ago.
    fn get(&self, key: &str, ttl: Duration) -> Option<V>;

    /// Stores `value` under `key`, stamped with the current instant.
    fn put(&self, key: &str, value: V);
}

/// Returns the fresh cached value for `key`, or computes, stores and returns a new one.
pub fn get_or_compute<V, C, F>(cache: &C, key: &str, ttl: Duration, compute: F) -> V
where
    V: Clone,
    C: CacheStore<V> + ?Sized,
    F: FnOnce() -> V,
{
    if let Some(value) = cache.get(key, ttl) {
        debug!("Cache hit for '{}'", key);
        return value;
    }
    debug!("Cache miss for '{}'", key);
    let value = compute();
    cache.put(key, value.clone());
    value
}

/// A cached payload and when it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub payload: V,
    pub stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Process-wide in-memory [`CacheStore`]. Starts empty.
pub struct ExpiringCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V> ExpiringCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries are whole values written in one step, so a poisoned lock
    /// still guards consistent data.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl<V> Default for ExpiringCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V> for ExpiringCache<V>
where
    V: Clone + Send,
{
    fn get(&self, key: &str, ttl: Duration) -> Option<V> {
        self.lock_entries()
            .get(key)
            .filter(|entry| entry.is_fresh(ttl))
            .map(|entry| entry.payload.clone())
    }

    fn put(&self, key: &str, value: V) {
        self.lock_entries().insert(
            key.to_string(),
            CacheEntry {
                payload: value,
                stored_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_compute_runs_once_within_ttl() {
        let cache = ExpiringCache::<String>::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            format!("payload-{}", calls.get())
        };

        let first = get_or_compute(&cache, "news_stock", TTL, compute);
        tokio::time::advance(Duration::from_secs(59)).await;
        let second = get_or_compute(&cache, "news_stock", TTL, compute);

        assert_eq!(first, "payload-1");
        assert_eq!(second, first);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_is_recomputed_and_overwritten() {
        let cache = ExpiringCache::<i32>::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            calls.get()
        };

        assert_eq!(get_or_compute(&cache, "k", TTL, compute), 1);
        tokio::time::advance(TTL).await;
        assert_eq!(cache.get("k", TTL), None);
        assert_eq!(cache.len(), 1);

        assert_eq!(get_or_compute(&cache, "k", TTL, compute), 2);
        assert_eq!(get_or_compute(&cache, "k", TTL, compute), 2);
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let cache = ExpiringCache::<&str>::new();
        cache.put("news_stock", "stock");
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.put("news_crypto", "crypto");
        tokio::time::advance(Duration::from_secs(40)).await;

        assert_eq!(cache.get("news_stock", TTL), None);
        assert_eq!(cache.get("news_crypto", TTL), Some("crypto"));
        assert_eq!(cache.get("missing", TTL), None);
    }

    #[test]
    fn test_works_through_trait_object() {
        let cache: Box<dyn CacheStore<u32>> = Box::new(ExpiringCache::<u32>::new());
        assert_eq!(get_or_compute(cache.as_ref(), "k", TTL, || 7), 7);
        assert_eq!(get_or_compute(cache.as_ref(), "k", TTL, || 8), 7);
    }
}
