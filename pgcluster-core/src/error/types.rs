//! Core error types for pgcluster
//!
//! This module contains the error enums raised while decoding, validating and
//! resolving cluster configuration, plus the crate-wide result alias.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to parse a unit-suffixed duration such as `10s` or `1h30m`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    #[error("malformed duration {input:?}: empty duration")]
    Empty { input: String },

    #[error("malformed duration {input:?}: missing unit")]
    MissingUnit { input: String },

    #[error("malformed duration {input:?}: unknown unit {unit:?}")]
    UnknownUnit { input: String, unit: String },

    #[error("malformed duration {input:?}: expected a number")]
    InvalidNumber { input: String },

    #[error("malformed duration {input:?}: value out of range")]
    Overflow { input: String },
}

impl DurationError {
    /// The text that failed to parse
    pub fn input(&self) -> &str {
        match self {
            DurationError::Empty { input }
            | DurationError::MissingUnit { input }
            | DurationError::UnknownUnit { input, .. }
            | DurationError::InvalidNumber { input }
            | DurationError::Overflow { input } => input,
        }
    }
}

/// A well-formed value that violates a field constraint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Wire name of the offending field
    pub field: &'static str,
    pub message: String,
}

/// Error type for every fallible configuration operation
///
/// `Decode` and `Validation` are kept apart so callers can tell "could not
/// parse" from "parsed but invalid" while both still fail the decode as a
/// whole.
#[derive(Error, Debug)]
pub enum ConfigError {
    // Wire syntax, including duration text rejected during deserialization
    #[error("failed to decode config: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("config validation failed: {0}")]
    Validation(#[source] ValidationError),

    #[error(transparent)]
    MalformedDuration(#[from] DurationError),

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
