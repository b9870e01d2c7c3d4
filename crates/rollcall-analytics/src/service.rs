//! Analytics service: validates, resolves, fetches, aggregates and caches.

use crate::aggregator::AggregationManager;
use crate::cache::{AnalyticsCache, CacheConfig, CacheStats};
use crate::filter::AnalyticsFilter;
use crate::range::{Clock, ResolvedRange, SystemClock};
use crate::source::{AttendanceSource, RecordQuery};
use crate::types::AnalyticsBundle;
use chrono_tz::Tz;
use rollcall_common::Result;
use rollcall_config::AnalyticsConfig;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Runtime settings for the service.
#[derive(Debug, Clone)]
pub struct AnalyticsSettings {
    pub cache_enabled: bool,
    pub max_records: usize,
    pub moving_average_window: usize,
    pub timezone: Tz,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            max_records: 10_000,
            moving_average_window: 7,
            timezone: chrono_tz::UTC,
        }
    }
}

impl AnalyticsSettings {
    pub fn from_config(config: &AnalyticsConfig) -> Result<Self> {
        Ok(Self {
            cache_enabled: config.cache_enabled,
            max_records: config.max_records,
            moving_average_window: config.moving_average_window,
            timezone: config.tz()?,
        })
    }
}

/// Computes analytics bundles with transparent caching.
pub struct AnalyticsService {
    source: Arc<dyn AttendanceSource>,
    cache: Arc<AnalyticsCache>,
    clock: Arc<dyn Clock>,
    aggregator: AggregationManager,
    settings: AnalyticsSettings,
}

impl AnalyticsService {
    pub fn new(
        source: Arc<dyn AttendanceSource>,
        cache: Arc<AnalyticsCache>,
        clock: Arc<dyn Clock>,
        settings: AnalyticsSettings,
    ) -> Self {
        if !settings.cache_enabled {
            warn!("Analytics cache disabled - every request recomputes");
        }
        Self {
            source,
            cache,
            clock,
            aggregator: AggregationManager::new(settings.moving_average_window),
            settings,
        }
    }

    /// Builds a service from configuration with the wall clock and a fresh cache.
    pub fn from_config(config: &AnalyticsConfig, source: Arc<dyn AttendanceSource>) -> Result<Self> {
        let cache = AnalyticsCache::new(CacheConfig {
            max_capacity: config.cache_max_capacity,
            ttl: config.cache_ttl(),
        });
        Ok(Self::new(
            source,
            Arc::new(cache),
            Arc::new(SystemClock),
            AnalyticsSettings::from_config(config)?,
        ))
    }

    /// Returns the bundle for `filter`, from cache when allowed.
    ///
    /// Invalid input fails before any record is fetched; a source failure
    /// fails before any aggregation starts.
    #[instrument(skip(self, filter), fields(time_range = %filter.time_range, no_cache = filter.no_cache))]
    pub async fn analytics(&self, filter: &AnalyticsFilter) -> Result<Arc<AnalyticsBundle>> {
        let range = ResolvedRange::resolve(filter, self.clock.now(), self.settings.timezone)?;
        let key = filter.signature();

        if self.settings.cache_enabled && !filter.no_cache {
            if let Some(entry) = self.cache.get(&key).await {
                debug!(computed_at = %entry.computed_at, "Serving cached analytics");
                return Ok(entry.bundle);
            }
        }

        info!(start = %range.start, end = %range.end, "Computing analytics");
        let query = RecordQuery::new(filter, &range, self.settings.max_records);
        let events = self.source.fetch_events(&query).await?;
        let total_students = self.source.count_students(&query).await?;
        debug!(events = events.len(), total_students, "Fetched records");

        let bundle = Arc::new(self.aggregator.aggregate_all(
            &events,
            &range,
            total_students,
            filter.risk_level,
        ));

        if self.settings.cache_enabled {
            self.cache.put(key, Arc::clone(&bundle)).await;
        }

        Ok(bundle)
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Invalidates every cached bundle and returns how many were dropped.
    pub async fn invalidate_cache(&self) -> u64 {
        self.cache.invalidate_all().await
    }
}
