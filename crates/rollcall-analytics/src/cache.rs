//! Result cache for computed analytics bundles, keyed by filter signature.

use crate::types::AnalyticsBundle;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the result cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of bundles kept
    pub max_capacity: u64,
    /// Time-to-live for each bundle
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1000,
            ttl: Duration::from_secs(600), // 10 minutes
        }
    }
}

/// Cached bundle with the instant it was computed.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub bundle: Arc<AnalyticsBundle>,
    pub computed_at: DateTime<Utc>,
}

/// Cache performance metrics
#[derive(Debug, Default)]
pub struct CacheMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub invalidations: AtomicU64,
}

impl CacheMetrics {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let total = hits + self.misses.load(Ordering::Relaxed) as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub entry_count: u64,
    pub hit_rate: f64,
    pub ttl_seconds: u64,
}

/// Bundle cache owned by one service instance.
pub struct AnalyticsCache {
    cache: Cache<String, CacheEntry>,
    config: CacheConfig,
    metrics: Arc<CacheMetrics>,
}

impl AnalyticsCache {
    pub fn new(config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            cache,
            config,
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    /// Stored entry if present and younger than the TTL.
    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        match self.cache.get(key).await {
            Some(entry) => {
                debug!("Cache hit");
                self.metrics.record_hit();
                Some(entry)
            }
            None => {
                debug!("Cache miss");
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Stores `bundle` under `key`, replacing any previous entry.
    #[instrument(skip(self, bundle))]
    pub async fn put(&self, key: String, bundle: Arc<AnalyticsBundle>) {
        let entry = CacheEntry {
            bundle,
            computed_at: Utc::now(),
        };
        self.cache.insert(key, entry).await;
    }

    /// Drops every entry.
    #[instrument(skip(self))]
    pub async fn invalidate_all(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        let entry_count = self.cache.entry_count();
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        self.metrics
            .invalidations
            .fetch_add(entry_count, Ordering::Relaxed);
        info!("Invalidated {} cached analytics bundles", entry_count);
        entry_count
    }

    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.run_pending_tasks().await;
        CacheStats {
            hits: self.metrics.hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            invalidations: self.metrics.invalidations.load(Ordering::Relaxed),
            entry_count: self.cache.entry_count(),
            hit_rate: self.metrics.hit_rate(),
            ttl_seconds: self.config.ttl.as_secs(),
        }
    }
}

impl Default for AnalyticsCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
