//! Constructor methods and predicates for ConfigError

use std::path::Path;

use super::types::{ConfigError, ValidationError};

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError {
            field,
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Create a validation error for a single field
    ///
    /// # Examples
    /// ```rust
    /// use pgcluster_core::error::ConfigError;
    ///
    /// let err = ConfigError::validation("max_standbys_per_sender", "max_standbys_per_sender must be at least 1");
    /// assert!(err.is_validation());
    /// ```
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Validation(ValidationError::new(field, message))
    }

    /// Create an IO error tagged with the path being read
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ConfigError::Validation(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            ConfigError::Decode(_) | ConfigError::MalformedDuration(_)
        )
    }

    /// The underlying validation failure, if this is one
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            ConfigError::Validation(err) => Some(err),
            _ => None,
        }
    }
}
