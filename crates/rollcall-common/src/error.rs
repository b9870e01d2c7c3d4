//! Error types and utilities for Rollcall

use thiserror::Error;

/// Result type alias for Rollcall operations
pub type Result<T> = std::result::Result<T, RollcallError>;

/// Main error type for Rollcall operations
#[derive(Error, Debug)]
pub enum RollcallError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failures reported by the attendance record source
    #[error("Record source error: {message}")]
    Source {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors for request parameters
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },
}

impl RollcallError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new record source error
    pub fn source_failure(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new record source error with the underlying cause
    pub fn source_failure_with(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Source {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether the error was caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Offending field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

/// Convert from serde_yaml::Error to RollcallError
impl From<serde_yaml::Error> for RollcallError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config_with_source("YAML parsing error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let config_error = RollcallError::config("config issue");
        assert!(config_error.to_string().contains("Configuration error"));
        assert!(config_error.to_string().contains("config issue"));

        let source_error = RollcallError::source_failure("database unreachable");
        assert!(source_error.to_string().contains("Record source error"));

        let validation_error = RollcallError::validation_field("Invalid date", "startDate");
        assert!(validation_error.to_string().contains("Validation error"));
        assert_eq!(validation_error.field(), Some("startDate"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(RollcallError::validation("bad range").is_client_error());
        assert!(!RollcallError::source_failure("timeout").is_client_error());
        assert!(!RollcallError::config("missing").is_client_error());
    }

    #[test]
    fn test_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let wrapped_error = RollcallError::source_failure_with("Failed to load dataset", io_error);

        assert!(wrapped_error.to_string().contains("Failed to load dataset"));
        assert!(wrapped_error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: RollcallError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_serde_error_conversion() {
        let invalid_json = r#"{"invalid": json}"#;
        let serde_error = serde_json::from_str::<serde_json::Value>(invalid_json).unwrap_err();
        let error: RollcallError = serde_error.into();

        assert!(error.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<Vec<u32>>("{ not: [a list").unwrap_err();
        let error: RollcallError = yaml_error.into();

        assert_eq!(error.to_string(), "Configuration error: YAML parsing error");
        assert!(error.source().is_some());
    }

    #[test]
    fn test_error_display_formatting() {
        let config_error = RollcallError::config("missing field");
        assert_eq!(format!("{}", config_error), "Configuration error: missing field");
    }
}
