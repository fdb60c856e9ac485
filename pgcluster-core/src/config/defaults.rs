//! Default configuration values for pgcluster
//!
//! This module centralizes every default so they are easy to find and modify.
//! Only user-changed values are stored in the cluster data; anything unset
//! picks up whatever is defined here at resolution time.

use crate::duration::Duration;

// Proxy defaults
pub const DEFAULT_PROXY_CHECK_INTERVAL: Duration = Duration::from_secs(5);

// Timing defaults
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SLEEP_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_KEEPER_FAIL_INTERVAL: Duration = Duration::from_secs(20);

// Replication defaults
pub const DEFAULT_MAX_STANDBYS_PER_SENDER: u32 = 3;
pub const DEFAULT_SYNCHRONOUS_REPLICATION: bool = false;
pub const DEFAULT_INIT_WITH_MULTIPLE_KEEPERS: bool = false;
pub const DEFAULT_USE_PG_REWIND: bool = false;
