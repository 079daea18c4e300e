//! Request-coalescing result cache for oracle and creation calls.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::cache::CacheStats;
use crate::observability::metrics;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// TTL cache whose check-then-populate runs under one lock.
///
/// Identical concurrent requests collapse into a single computation; only
/// `Ok` results are stored.
pub struct ResultCache<V> {
    name: &'static str,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> ResultCache<V> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, or compute, store and return it.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: String, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);

        if let Some(entry) = entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            metrics::record_cache_lookup(self.name, true);
            tracing::info!(cache = self.name, key = %key, "Delivering from cache");
            return Ok(entry.value.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_lookup(self.name, false);
        tracing::info!(cache = self.name, key = %key, "No cache hit");

        let value = compute().await?;
        entries.insert(
            key,
            CacheEntry {
                value: value.clone(),
                inserted_at: Instant::now(),
            },
        );
        Ok(value)
    }

    /// Number of live entries.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries
            .values()
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .count()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_concurrent_identical_requests_compute_once() {
        let cache = Arc::new(ResultCache::<u64>::new("test", Duration::from_secs(10)));
        let computations = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let cache = cache.clone();
                let computations = computations.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_try_insert_with("ETH-0xabc-0xpool".to_string(), || async move {
                            tokio::time::sleep(Duration::from_millis(30)).await;
                            Ok::<_, ()>(computations.fetch_add(1, Ordering::SeqCst) + 7)
                        })
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(7));
        }
        assert_eq!(computations.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hit_rate(), 0.8);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = ResultCache::<u64>::new("test", Duration::from_secs(10));

        let first: Result<u64, &str> = cache
            .get_or_try_insert_with("k".into(), || async { Err("rpc down") })
            .await;
        assert_eq!(first, Err("rpc down"));
        assert_eq!(cache.len().await, 0);

        let second: Result<u64, &str> = cache
            .get_or_try_insert_with("k".into(), || async { Ok(3) })
            .await;
        assert_eq!(second, Ok(3));
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = ResultCache::<u64>::new("test", Duration::from_millis(30));

        let _ = cache.get_or_try_insert_with("k".into(), || async { Ok::<_, ()>(1) }).await;
        assert_eq!(cache.len().await, 1);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.len().await, 0);

        let refreshed = cache.get_or_try_insert_with("k".into(), || async { Ok::<_, ()>(2) }).await;
        assert_eq!(refreshed, Ok(2));
    }

    #[tokio::test]
    async fn test_distinct_keys_are_independent() {
        let cache = ResultCache::<&'static str>::new("test", Duration::from_secs(10));

        let a = cache.get_or_try_insert_with("a".into(), || async { Ok::<_, ()>("A") }).await;
        let b = cache.get_or_try_insert_with("b".into(), || async { Ok::<_, ()>("B") }).await;
        assert_eq!((a, b), (Ok("A"), Ok("B")));
        assert_eq!(cache.len().await, 2);
    }
}
