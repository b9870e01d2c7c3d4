//! Configuration schema definitions using serde with validation attributes.

use chrono_tz::Tz;
use rollcall_common::{LoggingConfig, RollcallError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Main configuration structure for Rollcall.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    #[validate]
    pub server: ServerConfig,
    /// Analytics engine configuration.
    #[validate]
    pub analytics: AnalyticsConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[validate(custom(
        function = "crate::validator::validate_socket_addr",
        message = "Bind address must be a valid socket address (e.g., 127.0.0.1:8080)"
    ))]
    pub bind_address: String,
    /// JSON dataset with `students` and `events` served by the in-memory record source.
    pub data_path: Option<PathBuf>,
    /// Whether to attach a permissive CORS layer.
    pub enable_cors: bool,
}

/// Analytics engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Whether computed bundles are cached at all.
    pub cache_enabled: bool,
    /// Lifetime of a cached bundle in seconds.
    #[validate(range(min = 1, max = 86400, message = "Cache TTL must be between 1 and 86400 seconds"))]
    pub cache_ttl_seconds: u64,
    /// Maximum number of cached bundles.
    #[validate(range(min = 1, max = 100000, message = "Cache capacity must be between 1 and 100000"))]
    pub cache_max_capacity: u64,
    /// Upper bound on events fetched per request.
    #[validate(range(min = 1, max = 1000000, message = "Max records must be between 1 and 1000000"))]
    pub max_records: usize,
    /// Upper bound on the trailing moving-average window.
    #[validate(range(min = 1, max = 31, message = "Moving average window must be between 1 and 31"))]
    pub moving_average_window: usize,
    /// IANA timezone used for calendar bucketing.
    #[validate(custom(
        function = "crate::validator::validate_timezone",
        message = "Timezone must be a valid IANA name (e.g., UTC, Asia/Manila)"
    ))]
    pub timezone: String,
}

impl AnalyticsConfig {
    /// Cache lifetime as a `Duration`.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Parsed timezone.
    pub fn tz(&self) -> Result<Tz, RollcallError> {
        self.timezone.parse::<Tz>().map_err(|e| {
            RollcallError::config(format!("Invalid timezone '{}': {}", self.timezone, e))
        })
    }
}

impl Config {
    /// Runs every validation rule, including nested sections.
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()
    }
}
