//! Resolution pipeline: decode, validate, copy, merge defaults, unwrap

use tracing::{debug, warn};

use super::partial::PartialConfig;
use super::resolved::ResolvedConfig;
use crate::error::ConfigResult;

// Clone, default, unwrap. Never touches the caller's instance.
fn resolve_unchecked(partial: &PartialConfig) -> ResolvedConfig {
    let mut merged = partial.clone();
    merged.merge_defaults();
    ResolvedConfig::from_merged(merged)
}

impl PartialConfig {
    /// Resolve into a configuration with every field populated
    ///
    /// Unset fields take their defaults. The input is validated first, so a
    /// hand-built partial with an out-of-range value is rejected here rather
    /// than producing a resolved value; a decoded partial never fails.
    pub fn to_resolved(&self) -> ConfigResult<ResolvedConfig> {
        self.validate()?;
        Ok(resolve_unchecked(self))
    }
}

impl ResolvedConfig {
    /// All defaults, no overrides
    ///
    /// Used to bootstrap a cluster that has no stored configuration yet.
    pub fn new_default() -> Self {
        resolve_unchecked(&PartialConfig::default())
    }
}

/// Decode a stored partial configuration blob and resolve it
///
/// This is the sequence run on every change notification from the store.
pub fn resolve_json(bytes: &[u8]) -> ConfigResult<ResolvedConfig> {
    let partial = PartialConfig::from_json_slice(bytes).map_err(|e| {
        warn!("Rejected cluster configuration: {}", e);
        e
    })?;
    let resolved = partial.to_resolved()?;
    debug!(
        overridden = partial.set_field_count(),
        "Resolved cluster configuration"
    );
    Ok(resolved)
}
