//! Default values for every configuration section.

use crate::schema::*;
use rollcall_common::LoggingConfig;

/// Default bind address for the HTTP server.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
/// Cached bundles live for ten minutes.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 600;
/// Default maximum number of cached bundles.
pub const DEFAULT_CACHE_MAX_CAPACITY: u64 = 1_000;
/// Default upper bound on events fetched per request.
pub const DEFAULT_MAX_RECORDS: usize = 10_000;
/// Default moving-average window.
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 7;
/// Default calendar timezone.
pub const DEFAULT_TIMEZONE: &str = "UTC";

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            analytics: AnalyticsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            data_path: None,
            enable_cors: true,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            cache_max_capacity: DEFAULT_CACHE_MAX_CAPACITY,
            max_records: DEFAULT_MAX_RECORDS,
            moving_average_window: DEFAULT_MOVING_AVERAGE_WINDOW,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}
