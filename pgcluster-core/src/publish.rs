//! Publication of the current cluster configuration
//!
//! Keepers, the sentinel and the proxy all read the same resolved
//! configuration, possibly from different threads. A published value is never
//! modified: an update resolves a new [`ResolvedConfig`] and swaps the shared
//! `Arc` wholesale, so readers see either the old or the new configuration and
//! never a mix of both.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::{PartialConfig, ResolvedConfig};
use crate::error::ConfigResult;

/// Single-writer, many-reader handle to the current configuration
pub struct ConfigPublisher {
    tx: watch::Sender<Arc<ResolvedConfig>>,

    /// Number of publications that changed the configuration
    version: AtomicU64,
}

impl ConfigPublisher {
    pub fn new(initial: ResolvedConfig) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self {
            tx,
            version: AtomicU64::new(0),
        }
    }

    /// Start from the all-defaults configuration
    pub fn with_defaults() -> Self {
        Self::new(ResolvedConfig::new_default())
    }

    /// Snapshot of the configuration currently published
    pub fn current(&self) -> Arc<ResolvedConfig> {
        self.tx.borrow().clone()
    }

    /// Subscribe to configuration changes
    pub fn subscribe(&self) -> watch::Receiver<Arc<ResolvedConfig>> {
        self.tx.subscribe()
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Replace the published configuration
    ///
    /// Returns `false` and leaves subscribers un-notified when `resolved`
    /// equals the current value.
    pub fn publish(&self, resolved: ResolvedConfig) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if **current == resolved {
                return false;
            }
            *current = Arc::new(resolved);
            self.version.fetch_add(1, Ordering::AcqRel);
            true
        });

        if changed {
            info!(version = self.version(), "Published new cluster configuration");
        }
        changed
    }

    /// Resolve `partial` and publish the result
    ///
    /// On error the previous configuration stays published.
    pub fn publish_partial(&self, partial: &PartialConfig) -> ConfigResult<bool> {
        let resolved = partial.to_resolved().map_err(|e| {
            warn!("Keeping previous cluster configuration: {}", e);
            e
        })?;
        Ok(self.publish(resolved))
    }

    /// Decode a stored blob, resolve it and publish the result
    ///
    /// On error the previous configuration stays published.
    pub fn publish_json(&self, bytes: &[u8]) -> ConfigResult<bool> {
        let resolved = crate::config::resolve_json(bytes)?;
        Ok(self.publish(resolved))
    }
}

impl Default for ConfigPublisher {
    fn default() -> Self {
        Self::with_defaults()
    }
}
