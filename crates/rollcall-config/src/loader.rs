//! Configuration loading from YAML files and `ROLLCALL_*` environment variables.

use crate::schema::Config;
use rollcall_common::{LogFormat, Result as RollcallResult, RollcallError};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "ROLLCALL_CONFIG_PATH";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name.
        var: String,
        /// Underlying parse failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for RollcallError {
    fn from(err: ConfigError) -> Self {
        RollcallError::config(err.to_string())
    }
}

/// Configuration loader for the service
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::load_from_str(&content)
    }

    /// Parse YAML text, apply environment overrides and validate.
    pub fn load_from_str(content: &str) -> Result<Config, ConfigError> {
        let mut config: Config = serde_yaml::from_str(content)?;
        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration from `path`, `ROLLCALL_CONFIG_PATH`, `./rollcall.yaml`,
    /// or built-in defaults, in that order.
    pub fn load(path: Option<&Path>) -> RollcallResult<Config> {
        let candidate = path
            .map(Path::to_path_buf)
            .or_else(|| env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from))
            .or_else(|| {
                ["rollcall.yaml", "rollcall.yml"]
                    .iter()
                    .map(PathBuf::from)
                    .find(|p| p.exists())
            });

        let config = match candidate {
            Some(file) => {
                debug!(path = %file.display(), "Loading configuration file");
                Self::load_config(&file)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                let mut config = Config::default();
                Self::apply_env_overrides(&mut config)?;
                config.validate_all().map_err(ConfigError::ValidationError)?;
                config
            }
        };

        Ok(config)
    }

    /// Apply overrides from the process environment.
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_with(config, |name| env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_with<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("ROLLCALL_BIND_ADDRESS") {
            config.server.bind_address = bind;
        }

        if let Some(path) = lookup("ROLLCALL_DATA_PATH") {
            config.server.data_path = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup("ROLLCALL_ENABLE_CORS") {
            config.server.enable_cors = parse_var("ROLLCALL_ENABLE_CORS", &value)?;
        }

        if let Some(value) = lookup("ROLLCALL_CACHE_ENABLED") {
            config.analytics.cache_enabled = parse_var("ROLLCALL_CACHE_ENABLED", &value)?;
        }

        if let Some(value) = lookup("ROLLCALL_CACHE_TTL_SECONDS") {
            config.analytics.cache_ttl_seconds = parse_var("ROLLCALL_CACHE_TTL_SECONDS", &value)?;
        }

        if let Some(value) = lookup("ROLLCALL_CACHE_MAX_CAPACITY") {
            config.analytics.cache_max_capacity =
                parse_var("ROLLCALL_CACHE_MAX_CAPACITY", &value)?;
        }

        if let Some(value) = lookup("ROLLCALL_MAX_RECORDS") {
            config.analytics.max_records = parse_var("ROLLCALL_MAX_RECORDS", &value)?;
        }

        if let Some(value) = lookup("ROLLCALL_MOVING_AVERAGE_WINDOW") {
            config.analytics.moving_average_window =
                parse_var("ROLLCALL_MOVING_AVERAGE_WINDOW", &value)?;
        }

        if let Some(timezone) = lookup("ROLLCALL_TIMEZONE") {
            config.analytics.timezone = timezone;
        }

        if let Some(level) = lookup("ROLLCALL_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(format) = lookup("ROLLCALL_LOG_FORMAT") {
            config.logging.format = parse_log_format(&format)?;
        }

        if let Some(dir) = lookup("ROLLCALL_LOG_DIR") {
            config.logging.log_directory = Some(PathBuf::from(dir));
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}

fn parse_log_format(value: &str) -> Result<LogFormat, ConfigError> {
    serde_yaml::from_str(&value.trim().to_lowercase()).map_err(|e| ConfigError::EnvParseError {
        var: "ROLLCALL_LOG_FORMAT".to_string(),
        source: Box::new(e),
    })
}
