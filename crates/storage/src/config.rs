//! Store configuration and builder
//!
//! A store is configured once, at construction. Nothing about sharding or the
//! duplicate-key policy can change afterwards, so every caller of a given
//! store sees the same create semantics.
//!
//! # Example
//!
//! ```
//! use rowdb_storage::{CreatePolicy, RowStore, StoreConfig};
//!
//! // Builder style
//! let store = RowStore::builder().shards(8).build().unwrap();
//! assert_eq!(store.shard_count(), 8);
//!
//! // From TOML text
//! let config = StoreConfig::from_toml_str(
//!     "shards = 4\ncreate_policy = \"reject_existing\"",
//! ).unwrap();
//! assert_eq!(config.create_policy, CreatePolicy::RejectExisting);
//! ```

use crate::sharded::RowStore;
use rowdb_core::{CreatePolicy, Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of shards
pub const DEFAULT_SHARDS: usize = 16;

/// Upper bound on the shard count
pub const MAX_SHARDS: usize = 1024;

/// Configuration for a [`RowStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Number of lock shards. Rounded up to a power of two.
    /// `1` gives the single-lock baseline.
    pub shards: usize,
    /// Duplicate-key policy for `create_row`
    pub create_policy: CreatePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shards: DEFAULT_SHARDS,
            create_policy: CreatePolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Parse and validate a TOML document.
    ///
    /// Missing fields fall back to their defaults; unknown fields are rejected.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the shard count is in range.
    pub fn validate(&self) -> Result<()> {
        if self.shards == 0 {
            return Err(Error::InvalidConfig("shards must be at least 1".into()));
        }
        if self.shards > MAX_SHARDS {
            return Err(Error::InvalidConfig(format!(
                "shards must be at most {}, got {}",
                MAX_SHARDS, self.shards
            )));
        }
        Ok(())
    }

    /// Shard count actually allocated (next power of two).
    pub fn effective_shards(&self) -> usize {
        self.shards.next_power_of_two()
    }
}

/// Builder for [`RowStore`].
///
/// ```
/// use rowdb_storage::{CreatePolicy, RowStore};
///
/// let baseline = RowStore::builder().single_lock().build().unwrap();
/// assert_eq!(baseline.shard_count(), 1);
///
/// let strict = RowStore::builder()
///     .policy(CreatePolicy::RejectExisting)
///     .build()
///     .unwrap();
/// assert_eq!(strict.policy(), CreatePolicy::RejectExisting);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RowStoreBuilder {
    config: StoreConfig,
}

impl RowStoreBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Set the number of shards.
    pub fn shards(mut self, shards: usize) -> Self {
        self.config.shards = shards;
        self
    }

    /// Use one shard, serializing every key behind a single lock.
    pub fn single_lock(self) -> Self {
        self.shards(1)
    }

    /// Set the duplicate-key policy.
    pub fn policy(mut self, policy: CreatePolicy) -> Self {
        self.config.create_policy = policy;
        self
    }

    /// Validate the configuration and build the store.
    pub fn build(self) -> Result<RowStore> {
        RowStore::with_config(self.config)
    }
}
