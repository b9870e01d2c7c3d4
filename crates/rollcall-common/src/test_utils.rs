//! Test utilities and shared fixtures for the Rollcall workspace.
//!
//! Available to other crates through the `testing` feature.

use crate::types::{AttendanceEvent, AttendanceStatus, DepartmentRef};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Test fixture for creating a UTC timestamp.
pub fn mock_timestamp(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .unwrap()
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Attendance event fixtures.
pub mod event_fixtures {
    use super::*;

    /// A department reference with predictable id and code.
    pub fn department(name: &str) -> DepartmentRef {
        DepartmentRef {
            department_id: format!("dept-{}", name.to_lowercase()),
            name: name.to_string(),
            code: name.chars().take(3).collect::<String>().to_uppercase(),
        }
    }

    /// An event with a random id.
    pub fn event(student: &str, status: AttendanceStatus, timestamp: DateTime<Utc>) -> AttendanceEvent {
        AttendanceEvent::new(uuid::Uuid::new_v4().to_string(), student, status, timestamp)
    }

    /// An event attached to the named department.
    pub fn event_in(
        student: &str,
        department_name: &str,
        status: AttendanceStatus,
        timestamp: DateTime<Utc>,
    ) -> AttendanceEvent {
        event(student, status, timestamp).with_department(department(department_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_init_logging_multiple_calls() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_mock_timestamp() {
        let timestamp = mock_timestamp(2024, 1, 1, 12, 0, 0);
        assert_eq!(timestamp.year(), 2024);
        assert_eq!(timestamp.hour(), 12);
    }

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(66.666, 66.67, 0.01);
    }

    #[test]
    #[should_panic]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq(1.0, 1.1, 0.05);
    }
}
