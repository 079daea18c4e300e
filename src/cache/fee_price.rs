//! Single-flight TTL cache around the fee price source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::blockchain::rail::FeePriceSource;
use crate::blockchain::types::BlockchainResult;
use crate::cache::CacheStats;
use crate::observability::metrics;

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    price: u128,
    fetched_at: Instant,
}

/// Caches the raw fee price for `ttl`.
///
/// The lock is held while the source is queried, so at most one request is
/// in flight and every concurrent caller gets its answer.
pub struct FeePriceCache {
    source: Arc<dyn FeePriceSource>,
    ttl: Duration,
    slot: Mutex<Option<CachedPrice>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FeePriceCache {
    pub fn new(source: Arc<dyn FeePriceSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slot: Mutex::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Current raw fee price, from cache when fresh.
    pub async fn get(&self) -> BlockchainResult<u128> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = *slot {
            if cached.fetched_at.elapsed() < self.ttl {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_lookup("fee_price", true);
                return Ok(cached.price);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_lookup("fee_price", false);
        *slot = None;

        match self.source.get_current_fee_price().await {
            Ok(price) => {
                tracing::debug!(price = price, "Fee price refreshed");
                *slot = Some(CachedPrice {
                    price,
                    fetched_at: Instant::now(),
                });
                Ok(price)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Fee price unavailable");
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
