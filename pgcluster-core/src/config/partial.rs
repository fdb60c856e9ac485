//! Partial cluster configuration
//!
//! Every tunable is an `Option`: `None` means "not provided, inherit the
//! default" and is kept distinct from an explicit zero or `false`. Only the
//! values an operator actually changed are stored in the cluster data, so a
//! default changed in a later release is picked up automatically.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::duration::Duration;
use crate::error::{ConfigError, ConfigResult, ValidationError};

/// Cluster configuration with every field optional
///
/// Deserializing through serde always validates; an instance that fails
/// [`PartialConfig::validate`] is never produced by a decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PartialConfigRepr")]
pub struct PartialConfig {
    /// Time after which any request (keeper checks from the sentinel etc.) fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<Duration>,

    /// Interval to wait before the next check, for every component
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_interval: Option<Duration>,

    /// Interval after the first failure to declare a keeper unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keeper_fail_interval: Option<Duration>,

    /// Max number of standbys for every sender (a master, or a standby when
    /// cascading)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_standbys_per_sender: Option<u32>,

    /// Use synchronous replication between the master and its standbys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synchronous_replication: Option<bool>,

    /// Choose a random initial master when multiple keepers are registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_with_multiple_keepers: Option<bool>,

    /// Whether to use pg_rewind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_pg_rewind: Option<bool>,

    /// Postgres parameters, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_parameters: Option<BTreeMap<String, String>>,
}

// Unvalidated wire shape; unknown keys are ignored.
#[derive(Deserialize)]
struct PartialConfigRepr {
    request_timeout: Option<Duration>,
    sleep_interval: Option<Duration>,
    keeper_fail_interval: Option<Duration>,
    max_standbys_per_sender: Option<u32>,
    synchronous_replication: Option<bool>,
    init_with_multiple_keepers: Option<bool>,
    use_pg_rewind: Option<bool>,
    pg_parameters: Option<BTreeMap<String, String>>,
}

impl PartialConfigRepr {
    fn into_unvalidated(self) -> PartialConfig {
        PartialConfig {
            request_timeout: self.request_timeout,
            sleep_interval: self.sleep_interval,
            keeper_fail_interval: self.keeper_fail_interval,
            max_standbys_per_sender: self.max_standbys_per_sender,
            synchronous_replication: self.synchronous_replication,
            init_with_multiple_keepers: self.init_with_multiple_keepers,
            use_pg_rewind: self.use_pg_rewind,
            pg_parameters: self.pg_parameters,
        }
    }
}

impl TryFrom<PartialConfigRepr> for PartialConfig {
    type Error = ConfigError;

    fn try_from(repr: PartialConfigRepr) -> Result<Self, Self::Error> {
        let config = repr.into_unvalidated();
        config.validate()?;
        Ok(config)
    }
}

fn check_non_negative(field: &'static str, value: Option<Duration>) -> Result<(), ValidationError> {
    match value {
        Some(d) if d.is_negative() => Err(ValidationError::new(
            field,
            format!("{} must be positive", field),
        )),
        _ => Ok(()),
    }
}

impl PartialConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a JSON blob and validate it
    ///
    /// Syntax problems are reported as [`ConfigError::Decode`]; a well-formed
    /// blob with an out-of-range value is reported as
    /// [`ConfigError::Validation`].
    pub fn from_json_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let repr: PartialConfigRepr = serde_json::from_slice(bytes)?;
        let config = repr.into_unvalidated();
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        Self::from_json_slice(text.as_bytes())
    }

    /// Load and validate a partial configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents =
            std::fs::read(path.as_ref()).map_err(|e| ConfigError::io(path.as_ref(), e))?;
        Self::from_json_slice(&contents)
    }

    /// Encode to JSON, omitting unset fields
    pub fn to_json_string(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_string_pretty(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the constraint of every present field
    ///
    /// Unset fields are always valid. The first violation is returned.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_non_negative("request_timeout", self.request_timeout)?;
        check_non_negative("sleep_interval", self.sleep_interval)?;
        check_non_negative("keeper_fail_interval", self.keeper_fail_interval)?;
        if let Some(max) = self.max_standbys_per_sender {
            if max < 1 {
                return Err(ValidationError::new(
                    "max_standbys_per_sender",
                    "max_standbys_per_sender must be at least 1",
                ));
            }
        }
        Ok(())
    }

    /// Fill every unset field with its default
    ///
    /// Mutates in place; clone first to keep the sparse form.
    pub fn merge_defaults(&mut self) {
        self.request_timeout.get_or_insert(DEFAULT_REQUEST_TIMEOUT);
        self.sleep_interval.get_or_insert(DEFAULT_SLEEP_INTERVAL);
        self.keeper_fail_interval
            .get_or_insert(DEFAULT_KEEPER_FAIL_INTERVAL);
        self.max_standbys_per_sender
            .get_or_insert(DEFAULT_MAX_STANDBYS_PER_SENDER);
        self.synchronous_replication
            .get_or_insert(DEFAULT_SYNCHRONOUS_REPLICATION);
        self.init_with_multiple_keepers
            .get_or_insert(DEFAULT_INIT_WITH_MULTIPLE_KEEPERS);
        self.use_pg_rewind.get_or_insert(DEFAULT_USE_PG_REWIND);
        self.pg_parameters.get_or_insert_with(BTreeMap::new);
    }

    /// Overlay `patch` on top of this configuration
    ///
    /// Fields set in `patch` win; fields unset in `patch` keep this
    /// configuration's value, set or not. A patched `pg_parameters` replaces
    /// the whole map. Neither input is modified.
    pub fn patch(&self, patch: &PartialConfig) -> PartialConfig {
        fn pick<T: Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
            over.as_ref().or(base.as_ref()).cloned()
        }

        PartialConfig {
            request_timeout: pick(&self.request_timeout, &patch.request_timeout),
            sleep_interval: pick(&self.sleep_interval, &patch.sleep_interval),
            keeper_fail_interval: pick(&self.keeper_fail_interval, &patch.keeper_fail_interval),
            max_standbys_per_sender: pick(
                &self.max_standbys_per_sender,
                &patch.max_standbys_per_sender,
            ),
            synchronous_replication: pick(
                &self.synchronous_replication,
                &patch.synchronous_replication,
            ),
            init_with_multiple_keepers: pick(
                &self.init_with_multiple_keepers,
                &patch.init_with_multiple_keepers,
            ),
            use_pg_rewind: pick(&self.use_pg_rewind, &patch.use_pg_rewind),
            pg_parameters: pick(&self.pg_parameters, &patch.pg_parameters),
        }
    }

    /// Like [`PartialConfig::patch`], rejecting a result that fails validation
    pub fn apply_patch(&self, patch: &PartialConfig) -> ConfigResult<PartialConfig> {
        let patched = self.patch(patch);
        patched.validate()?;
        Ok(patched)
    }

    /// Number of fields that carry an explicit value
    pub fn set_field_count(&self) -> usize {
        [
            self.request_timeout.is_some(),
            self.sleep_interval.is_some(),
            self.keeper_fail_interval.is_some(),
            self.max_standbys_per_sender.is_some(),
            self.synchronous_replication.is_some(),
            self.init_with_multiple_keepers.is_some(),
            self.use_pg_rewind.is_some(),
            self.pg_parameters.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.set_field_count() == 0
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_sleep_interval(mut self, interval: Duration) -> Self {
        self.sleep_interval = Some(interval);
        self
    }

    pub fn with_keeper_fail_interval(mut self, interval: Duration) -> Self {
        self.keeper_fail_interval = Some(interval);
        self
    }

    pub fn with_max_standbys_per_sender(mut self, max: u32) -> Self {
        self.max_standbys_per_sender = Some(max);
        self
    }

    pub fn with_synchronous_replication(mut self, enabled: bool) -> Self {
        self.synchronous_replication = Some(enabled);
        self
    }

    pub fn with_init_with_multiple_keepers(mut self, enabled: bool) -> Self {
        self.init_with_multiple_keepers = Some(enabled);
        self
    }

    pub fn with_use_pg_rewind(mut self, enabled: bool) -> Self {
        self.use_pg_rewind = Some(enabled);
        self
    }

    /// Set the whole parameter map, copying each entry
    pub fn with_pg_parameters<I, K, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.pg_parameters = Some(
            parameters
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"request_timeout": "-1s"}"#, "request_timeout must be positive")]
    #[case(r#"{"sleep_interval": "-1ns"}"#, "sleep_interval must be positive")]
    #[case(r#"{"keeper_fail_interval": "-20s"}"#, "keeper_fail_interval must be positive")]
    #[case(r#"{"max_standbys_per_sender": 0}"#, "max_standbys_per_sender must be at least 1")]
    fn test_decode_rejects_invalid(#[case] input: &str, #[case] message: &str) {
        let err = PartialConfig::from_json_str(input).unwrap_err();
        assert!(err.is_validation(), "expected validation error, got {err}");
        assert_eq!(err.to_string(), format!("config validation failed: {message}"));
    }

    #[rstest]
    #[case(r#"{"max_standbys_per_sender": 1}"#)]
    #[case(r#"{"request_timeout": "0s"}"#)]
    #[case(r#"{"synchronous_replication": false}"#)]
    #[case(r#"{"pg_parameters": {}}"#)]
    #[case(r#"{}"#)]
    fn test_decode_accepts_valid(#[case] input: &str) {
        assert!(PartialConfig::from_json_str(input).is_ok());
    }

    #[rstest]
    #[case(r#"{"request_timeout": "10"}"#)]
    #[case(r#"{"request_timeout": 10}"#)]
    #[case(r#"{"max_standbys_per_sender": -1}"#)]
    #[case(r#"{"use_pg_rewind": "yes"}"#)]
    #[case(r#"{"pg_parameters": {"max_connections": 100}}"#)]
    #[case(r#"[]"#)]
    #[case(r#"{"#)]
    fn test_decode_rejects_malformed(#[case] input: &str) {
        let err = PartialConfig::from_json_str(input).unwrap_err();
        assert!(err.is_decode(), "expected decode error, got {err}");
    }

    #[test]
    fn test_first_violation_wins() {
        let config = PartialConfig::new()
            .with_request_timeout(Duration::from_secs(-1))
            .with_max_standbys_per_sender(0);
        assert_eq!(config.validate().unwrap_err().field, "request_timeout");
    }

    #[test]
    fn test_unset_is_distinct_from_zero() {
        let unset = PartialConfig::from_json_str("{}").unwrap();
        let zero = PartialConfig::from_json_str(r#"{"request_timeout": "0s", "use_pg_rewind": false}"#)
            .unwrap();

        assert_eq!(unset.request_timeout, None);
        assert_eq!(zero.request_timeout, Some(Duration::ZERO));
        assert_eq!(unset.use_pg_rewind, None);
        assert_eq!(zero.use_pg_rewind, Some(false));
        assert_ne!(unset, zero);
    }

    #[test]
    fn test_null_and_unknown_keys() {
        let config = PartialConfig::from_json_str(
            r#"{"request_timeout": null, "proxy_timeout": "3s", "sleep_interval": "2s"}"#,
        )
        .unwrap();
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.sleep_interval, Some(Duration::from_secs(2)));
        assert_eq!(config.set_field_count(), 1);
    }

    #[test]
    fn test_encode_omits_unset() {
        let config = PartialConfig::new()
            .with_max_standbys_per_sender(5)
            .with_sleep_interval(Duration::from_millis(100));
        assert_eq!(
            config.to_json_string().unwrap(),
            r#"{"sleep_interval":"100ms","max_standbys_per_sender":5}"#
        );
        assert_eq!(PartialConfig::new().to_json_string().unwrap(), "{}");
    }

    #[test]
    fn test_serde_deserialize_validates() {
        let err = serde_json::from_str::<PartialConfig>(r#"{"max_standbys_per_sender": 0}"#)
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("config validation failed: max_standbys_per_sender must be at least 1"));
    }

    #[test]
    fn test_merge_defaults_fills_only_unset() {
        let mut config = PartialConfig::new()
            .with_request_timeout(Duration::ZERO)
            .with_synchronous_replication(true);
        config.merge_defaults();

        assert_eq!(config.request_timeout, Some(Duration::ZERO));
        assert_eq!(config.synchronous_replication, Some(true));
        assert_eq!(config.sleep_interval, Some(DEFAULT_SLEEP_INTERVAL));
        assert_eq!(config.keeper_fail_interval, Some(DEFAULT_KEEPER_FAIL_INTERVAL));
        assert_eq!(config.max_standbys_per_sender, Some(3));
        assert_eq!(config.init_with_multiple_keepers, Some(false));
        assert_eq!(config.use_pg_rewind, Some(false));
        assert_eq!(config.pg_parameters, Some(BTreeMap::new()));
        assert_eq!(config.set_field_count(), 8);
    }

    #[test]
    fn test_merge_defaults_idempotent() {
        let mut once = PartialConfig::new().with_max_standbys_per_sender(7);
        once.merge_defaults();
        let mut twice = once.clone();
        twice.merge_defaults();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clone_is_deep() {
        let original = PartialConfig::new().with_pg_parameters([("work_mem", "4MB")]);
        let mut copy = original.clone();
        copy.pg_parameters
            .as_mut()
            .unwrap()
            .insert("shared_buffers".to_string(), "1GB".to_string());
        assert_eq!(original.pg_parameters.as_ref().unwrap().len(), 1);

        let mut original = original;
        original
            .pg_parameters
            .as_mut()
            .unwrap()
            .insert("work_mem".to_string(), "8MB".to_string());
        assert_eq!(copy.pg_parameters.as_ref().unwrap()["work_mem"], "4MB");
    }

    #[test]
    fn test_clone_of_absent_config() {
        let absent: Option<PartialConfig> = None;
        assert_eq!(absent.clone(), None);
        assert!(PartialConfig::new().clone().is_empty());
    }

    #[test]
    fn test_patch_overrides_set_fields_only() {
        let base = PartialConfig::new()
            .with_request_timeout(Duration::from_secs(30))
            .with_use_pg_rewind(true)
            .with_pg_parameters([("work_mem", "4MB"), ("max_connections", "200")]);
        let patch = PartialConfig::new()
            .with_use_pg_rewind(false)
            .with_sleep_interval(Duration::from_secs(1))
            .with_pg_parameters([("work_mem", "8MB")]);

        let patched = base.patch(&patch);

        assert_eq!(patched.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(patched.use_pg_rewind, Some(false));
        assert_eq!(patched.sleep_interval, Some(Duration::from_secs(1)));
        assert_eq!(patched.keeper_fail_interval, None);
        assert_eq!(
            patched.pg_parameters,
            Some(BTreeMap::from([("work_mem".to_string(), "8MB".to_string())]))
        );
        assert_eq!(base.use_pg_rewind, Some(true));
    }

    #[test]
    fn test_apply_patch_rejects_invalid_result() {
        let base = PartialConfig::new();
        let patch = PartialConfig::new().with_max_standbys_per_sender(0);
        assert!(base.apply_patch(&patch).unwrap_err().is_validation());
    }
}
