//! Tests for error construction and conversion
//!
//! Checks that `?` lifts the underlying error types and that the two failure
//! kinds stay distinguishable.

use super::{ConfigError, ConfigResult, DurationError, ValidationError};

#[test]
fn test_json_error_conversion() {
    fn decode() -> ConfigResult<serde_json::Value> {
        Ok(serde_json::from_str("{not json")?)
    }

    let err = decode().unwrap_err();
    assert!(err.is_decode());
    assert!(!err.is_validation());
    assert!(err.to_string().starts_with("failed to decode config: "));
}

#[test]
fn test_validation_error_prefix() {
    let err: ConfigError = ValidationError::new("sleep_interval", "sleep_interval must be positive").into();
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "config validation failed: sleep_interval must be positive"
    );
    assert_eq!(err.validation_error().map(|e| e.field), Some("sleep_interval"));
}

#[test]
fn test_duration_error_conversion() {
    fn parse() -> ConfigResult<()> {
        Err(DurationError::MissingUnit {
            input: "10".to_string(),
        })?
    }

    let err = parse().unwrap_err();
    assert!(err.is_decode());
    assert_eq!(err.to_string(), "malformed duration \"10\": missing unit");
}

#[test]
fn test_io_error_carries_path() {
    let err = ConfigError::io(
        "/etc/pgcluster/config.json",
        std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
    );
    assert!(err
        .to_string()
        .contains("/etc/pgcluster/config.json"));
    assert!(!err.is_decode());
}
