//! Error conversion implementations for ConfigError
//!
//! These let `?` lift serde and validation failures into the crate error.

use super::types::{ConfigError, ValidationError};

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Decode(err)
    }
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::Validation(err)
    }
}
