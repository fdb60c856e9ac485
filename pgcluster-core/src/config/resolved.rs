//! Fully resolved cluster configuration

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use super::defaults::*;
use super::partial::PartialConfig;

/// Cluster configuration with every field concrete
///
/// Only produced by the resolution pipeline, so every instance has been
/// validated and defaulted. Treat it as immutable: publish a new value rather
/// than changing a shared one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    #[serde(with = "crate::duration::serde_std")]
    request_timeout: Duration,

    #[serde(with = "crate::duration::serde_std")]
    sleep_interval: Duration,

    #[serde(with = "crate::duration::serde_std")]
    keeper_fail_interval: Duration,

    max_standbys_per_sender: u32,
    synchronous_replication: bool,
    init_with_multiple_keepers: bool,
    use_pg_rewind: bool,
    pg_parameters: BTreeMap<String, String>,
}

impl ResolvedConfig {
    // `merged` has been through merge_defaults, so the fallbacks never apply.
    pub(super) fn from_merged(merged: PartialConfig) -> Self {
        ResolvedConfig {
            request_timeout: merged
                .request_timeout
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
                .to_std(),
            sleep_interval: merged
                .sleep_interval
                .unwrap_or(DEFAULT_SLEEP_INTERVAL)
                .to_std(),
            keeper_fail_interval: merged
                .keeper_fail_interval
                .unwrap_or(DEFAULT_KEEPER_FAIL_INTERVAL)
                .to_std(),
            max_standbys_per_sender: merged
                .max_standbys_per_sender
                .unwrap_or(DEFAULT_MAX_STANDBYS_PER_SENDER),
            synchronous_replication: merged
                .synchronous_replication
                .unwrap_or(DEFAULT_SYNCHRONOUS_REPLICATION),
            init_with_multiple_keepers: merged
                .init_with_multiple_keepers
                .unwrap_or(DEFAULT_INIT_WITH_MULTIPLE_KEEPERS),
            use_pg_rewind: merged.use_pg_rewind.unwrap_or(DEFAULT_USE_PG_REWIND),
            pg_parameters: merged.pg_parameters.unwrap_or_default(),
        }
    }

    /// Time after which any request fails
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Interval to wait before the next check
    pub fn sleep_interval(&self) -> Duration {
        self.sleep_interval
    }

    /// Interval after the first failure to declare a keeper unhealthy
    pub fn keeper_fail_interval(&self) -> Duration {
        self.keeper_fail_interval
    }

    pub fn max_standbys_per_sender(&self) -> u32 {
        self.max_standbys_per_sender
    }

    pub fn synchronous_replication(&self) -> bool {
        self.synchronous_replication
    }

    pub fn init_with_multiple_keepers(&self) -> bool {
        self.init_with_multiple_keepers
    }

    pub fn use_pg_rewind(&self) -> bool {
        self.use_pg_rewind
    }

    pub fn pg_parameters(&self) -> &BTreeMap<String, String> {
        &self.pg_parameters
    }

    pub fn pg_parameter(&self, name: &str) -> Option<&str> {
        self.pg_parameters.get(name).map(String::as_str)
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::new_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_durations_as_text() {
        let json = serde_json::to_value(ResolvedConfig::new_default()).unwrap();
        assert_eq!(json["request_timeout"], "10s");
        assert_eq!(json["sleep_interval"], "5s");
        assert_eq!(json["keeper_fail_interval"], "20s");
        assert_eq!(json["max_standbys_per_sender"], 3);
        assert_eq!(json["pg_parameters"], serde_json::json!({}));
    }

    #[test]
    fn test_clone_does_not_alias_parameters() {
        let resolved = PartialConfig::new()
            .with_pg_parameters([("work_mem", "4MB")])
            .to_resolved()
            .unwrap();
        let copy = resolved.clone();
        assert_eq!(copy, resolved);
        assert!(!std::ptr::eq(copy.pg_parameters(), resolved.pg_parameters()));
        assert_eq!(copy.pg_parameter("work_mem"), Some("4MB"));
        assert_eq!(copy.pg_parameter("shared_buffers"), None);
    }
}
