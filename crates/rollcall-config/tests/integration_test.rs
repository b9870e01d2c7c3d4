//! Integration tests for rollcall-config crate.

use rollcall_config::{Config, ConfigLoader};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_default_config_validation() {
    let mut config = Config::default();
    assert!(config.validate_all().is_ok());

    config.analytics.cache_ttl_seconds = 0;
    assert!(config.validate_all().is_err());

    config.analytics.cache_ttl_seconds = 600;
    config.server.bind_address = "not an address".to_string();
    assert!(config.validate_all().is_err());
}

#[test]
fn test_load_explicit_path() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "analytics:\n  max_records: 500\n  moving_average_window: 5").unwrap();

    let config = ConfigLoader::load(Some(file.path())).unwrap();
    assert_eq!(config.analytics.max_records, 500);
    assert_eq!(config.analytics.moving_average_window, 5);
    assert_eq!(config.analytics.tz().unwrap(), chrono_tz::UTC);
}

#[test]
fn test_load_missing_explicit_path_is_config_error() {
    let err = ConfigLoader::load(Some(std::path::Path::new("/definitely/missing.yaml")))
        .unwrap_err();
    assert!(matches!(err, rollcall_common::RollcallError::Config { .. }));
}

#[test]
fn test_demo_configuration_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/rollcall.yaml");
    let config = ConfigLoader::load_config(path).unwrap();
    assert_eq!(config.analytics.cache_ttl_seconds, 600);
    assert!(config.server.data_path.is_some());
}
