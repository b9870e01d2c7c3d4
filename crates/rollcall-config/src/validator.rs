//! Custom validation functions for configuration fields.

use chrono_tz::Tz;
use std::net::SocketAddr;
use validator::ValidationError;

/// Validates an IANA timezone name.
pub fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    if timezone.is_empty() {
        return Err(ValidationError::new("empty_timezone"));
    }

    match timezone.parse::<Tz>() {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("invalid_timezone")),
    }
}

/// Validates a `host:port` socket address.
pub fn validate_socket_addr(address: &str) -> Result<(), ValidationError> {
    match address.parse::<SocketAddr>() {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("invalid_socket_addr")),
    }
}
