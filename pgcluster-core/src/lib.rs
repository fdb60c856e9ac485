//! Configuration resolution for the pgcluster coordinator
//!
//! Operators supply a sparse [`PartialConfig`](config::PartialConfig); the
//! rest of the system consumes a [`ResolvedConfig`](config::ResolvedConfig)
//! in which every tunable has a concrete value.
//!
//! ```text
//! wire bytes ─> PartialConfig ─(validate, default)─> ResolvedConfig ─> ConfigPublisher
//! ```

pub mod config;
pub mod duration;
pub mod error;
pub mod publish;

pub use config::{resolve_json, PartialConfig, ResolvedConfig};
pub use duration::Duration;
pub use error::{ConfigError, ConfigResult, DurationError, ValidationError};
pub use publish::ConfigPublisher;
