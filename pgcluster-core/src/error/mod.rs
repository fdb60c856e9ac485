//! Error handling for pgcluster configuration
//!
//! Configuration can fail in two distinct ways, and callers need to tell them
//! apart:
//!
//! - **Decode errors**: the wire bytes are not a well-formed configuration
//!   object (bad JSON, wrong types, malformed duration text).
//! - **Validation errors**: the object is well-formed but a present field
//!   violates its constraint (negative interval, zero standbys).
//!
//! Both abort the decode as a whole; no half-valid configuration is ever
//! returned. Copying and default-merging cannot fail.
//!
//! ```text
//! wire bytes ──decode──> PartialConfig ──validate──> ok
//!      │                                   │
//!      └── ConfigError::Decode             └── ConfigError::Validation
//! ```

pub mod types;
pub mod constructors;
pub mod conversions;

pub use types::{ConfigError, ConfigResult, DurationError, ValidationError};

#[cfg(test)]
mod tests;
