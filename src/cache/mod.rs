//! Process-wide caches in front of external calls.
//!
//! # Design Decisions
//! - Each cache is an explicitly constructed object with an injected TTL,
//!   owned by the gateway composition root (no globals)
//! - One `tokio::sync::Mutex` per cache, held across the external call so
//!   concurrent identical requests wait instead of duplicating the call
//! - Entries expire by TTL only; failures are never stored

pub mod fee_price;
pub mod result;

pub use fee_price::FeePriceCache;
pub use result::ResultCache;

/// Cache statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
