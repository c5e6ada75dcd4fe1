//! Historical series caching with TTL support.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tasacalc_common::time::constants;
use tasacalc_common::{ForeignCurrency, HistoricalRate};
use tracing::debug;

/// Cached series entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    series: Arc<Vec<HistoricalRate>>,
    cached_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn new(series: Vec<HistoricalRate>, ttl: Duration) -> Self {
        Self {
            series: Arc::new(series),
            cached_at: Utc::now(),
            ttl,
        }
    }

    fn is_valid(&self) -> bool {
        Utc::now().signed_duration_since(self.cached_at) < self.ttl
    }
}

/// Configuration for the historical series cache.
#[derive(Debug, Clone)]
pub struct HistoricalCacheConfig {
    /// Default TTL for cached series.
    pub default_ttl: Duration,
    /// Maximum number of entries.
    pub max_entries: usize,
}

impl Default for HistoricalCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: constants::history_cache_ttl(),
            max_entries: ForeignCurrency::ALL.len(),
        }
    }
}

/// Thread-safe cache of historical series, one per currency.
pub struct HistoricalRateCache {
    cache: DashMap<ForeignCurrency, CacheEntry>,
    config: HistoricalCacheConfig,
}

impl HistoricalRateCache {
    /// Create a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(HistoricalCacheConfig::default())
    }

    /// Create a new cache with custom configuration.
    pub fn with_config(config: HistoricalCacheConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
        }
    }

    /// Get a series from cache if still fresh.
    pub fn get(&self, currency: ForeignCurrency) -> Option<Arc<Vec<HistoricalRate>>> {
        if let Some(entry) = self.cache.get(&currency) {
            if entry.is_valid() {
                debug!(currency = %currency, "Cache hit");
                return Some(entry.series.clone());
            }
            debug!(currency = %currency, "Cache entry expired");
            drop(entry);
            self.cache.remove(&currency);
        }

        debug!(currency = %currency, "Cache miss");
        None
    }

    /// Insert a series with the default TTL.
    pub fn insert(
        &self,
        currency: ForeignCurrency,
        series: Vec<HistoricalRate>,
    ) -> Arc<Vec<HistoricalRate>> {
        if self.cache.len() >= self.config.max_entries {
            self.evict_expired();
        }

        let entry = CacheEntry::new(series, self.config.default_ttl);
        let shared = entry.series.clone();
        self.cache.insert(currency, entry);
        shared
    }

    /// Get the number of entries in cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Evict expired entries.
    pub fn evict_expired(&self) {
        self.cache.retain(|_, entry| entry.is_valid());
    }
}

impl Default for HistoricalRateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration as StdDuration;

    fn series(rate: f64) -> Vec<HistoricalRate> {
        vec![HistoricalRate::new("2024-05-02".parse().unwrap(), rate)]
    }

    #[test]
    fn test_cache_insert_and_get() {
        let cache = HistoricalRateCache::new();
        cache.insert(ForeignCurrency::Usd, series(140.33));

        let cached = cache.get(ForeignCurrency::Usd).unwrap();
        assert_eq!(cached[0].rate, 140.33);
        assert!(cache.get(ForeignCurrency::Eur).is_none());
    }

    #[test]
    fn test_cache_expiry() {
        let cache = HistoricalRateCache::with_config(HistoricalCacheConfig {
            default_ttl: Duration::milliseconds(50),
            ..Default::default()
        });
        cache.insert(ForeignCurrency::Eur, series(151.2));

        assert!(cache.get(ForeignCurrency::Eur).is_some());

        sleep(StdDuration::from_millis(60));

        assert!(cache.get(ForeignCurrency::Eur).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evict_expired_keeps_fresh() {
        let cache = HistoricalRateCache::new();
        cache.insert(ForeignCurrency::Usd, series(140.0));
        cache.insert(ForeignCurrency::Eur, series(151.0));
        assert_eq!(cache.len(), 2);

        cache.evict_expired();
        assert_eq!(cache.len(), 2);

        cache.insert(ForeignCurrency::Usd, series(141.0));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(ForeignCurrency::Usd).unwrap()[0].rate, 141.0);
    }
}
