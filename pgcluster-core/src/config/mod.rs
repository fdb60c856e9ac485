//! Cluster configuration
//!
//! Two representations of the same tunable set:
//!
//! - [`PartialConfig`]: what an operator supplied, every field optional. This
//!   is what gets stored in the cluster data and what patches are written in.
//! - [`ResolvedConfig`]: every field concrete, produced by merging a partial
//!   configuration with the defaults in [`defaults`].
//!
//! ```rust
//! use pgcluster_core::config::PartialConfig;
//! use std::time::Duration;
//!
//! let partial = PartialConfig::from_json_str(r#"{"max_standbys_per_sender": 5}"#).unwrap();
//! let resolved = partial.to_resolved().unwrap();
//!
//! assert_eq!(resolved.max_standbys_per_sender(), 5);
//! assert_eq!(resolved.request_timeout(), Duration::from_secs(10));
//! ```

pub mod defaults;
mod partial;
mod resolve;
mod resolved;

pub use defaults::*;
pub use partial::PartialConfig;
pub use resolve::resolve_json;
pub use resolved::ResolvedConfig;
