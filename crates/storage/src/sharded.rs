//! Sharded row storage
//!
//! Keys are hashed with FxHash onto a fixed, power-of-two number of shards.
//! Each shard is an `FxHashMap` behind its own `RwLock`.
//!
//! # Design
//!
//! - Reads take the shard read lock and clone the value out, so a read never
//!   observes a half-written row.
//! - Check-then-create and check-then-delete run under one write-guard
//!   acquisition. No other thread can act on the key between the check and
//!   the act.
//! - Keys in different shards never contend. One shard is the single-lock
//!   baseline.
//! - Versions are allocated while the shard is write-locked, so on any one
//!   key the version order is the linearization order.
//!
//! # Example
//!
//! ```
//! use rowdb_storage::RowStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(RowStore::new());
//! store.create_row("row1", "value1").unwrap();
//! assert_eq!(store.get_row("row1").unwrap(), "value1");
//! assert!(store.delete_row("row1").unwrap());
//! assert!(!store.does_row_exist("row1"));
//! ```

use crate::config::{RowStoreBuilder, StoreConfig};
use crate::sync::{AtomicU64, Ordering, RwLock, RwLockReadGuard, RwLockWriteGuard};
use rowdb_core::{CreatePolicy, Error, Result, Versioned};
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use tracing::trace;

/// One lock's worth of rows.
#[derive(Debug)]
pub(crate) struct Shard {
    /// HashMap with FxHash for O(1) lookups
    pub(crate) data: FxHashMap<String, Versioned<String>>,
}

impl Shard {
    /// Create a new empty shard
    pub(crate) fn new() -> Self {
        Self {
            data: FxHashMap::default(),
        }
    }

    /// Get number of rows in this shard
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if shard is empty
    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for Shard {
    fn default() -> Self {
        Self::new()
    }
}

/// Concurrent map from string keys to string values.
///
/// # Thread Safety
///
/// Every operation is atomic with respect to every other operation on the
/// same key. Share a store between callers with `Arc<RowStore>`; it owns all
/// of its rows and nothing outlives it.
pub struct RowStore {
    shards: Box<[RwLock<Shard>]>,
    /// `shards.len() - 1`; shard count is a power of two
    mask: usize,
    /// Last allocated version
    version: AtomicU64,
    policy: CreatePolicy,
}

impl RowStore {
    /// Create a store with the default configuration
    /// (16 shards, overwrite policy).
    pub fn new() -> Self {
        Self::from_validated(StoreConfig::default())
    }

    /// Create a store from a configuration, validating it first.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// Start building a store.
    pub fn builder() -> RowStoreBuilder {
        RowStoreBuilder::new()
    }

    fn from_validated(config: StoreConfig) -> Self {
        let count = config.effective_shards();
        let shards: Vec<_> = (0..count).map(|_| RwLock::new(Shard::new())).collect();
        Self {
            shards: shards.into_boxed_slice(),
            mask: count - 1,
            version: AtomicU64::new(0),
            policy: config.create_policy,
        }
    }

    /// Duplicate-key policy this store was built with.
    pub fn policy(&self) -> CreatePolicy {
        self.policy
    }

    /// Number of lock shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Last allocated version (0 before the first create).
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    #[inline]
    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    #[inline]
    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        (hasher.finish() as usize) & self.mask
    }

    #[inline]
    fn read_shard(&self, key: &str) -> RwLockReadGuard<'_, Shard> {
        self.shards[self.shard_index(key)].read()
    }

    #[inline]
    fn write_shard(&self, key: &str) -> RwLockWriteGuard<'_, Shard> {
        self.shards[self.shard_index(key)].write()
    }

    // ========================================================================
    // Row operations
    // ========================================================================

    /// Install `(key, value)` and return the version it was stamped with.
    ///
    /// Under [`CreatePolicy::Overwrite`] an existing row is replaced and the
    /// call always succeeds. Under [`CreatePolicy::RejectExisting`] an
    /// existing row is left untouched and `Error::AlreadyExists` is returned.
    pub fn create_row(&self, key: &str, value: impl Into<String>) -> Result<u64> {
        let value = value.into();
        let mut shard = self.write_shard(key);

        if !self.policy.overwrites() && shard.data.contains_key(key) {
            trace!(key, "create_row rejected, key exists");
            return Err(Error::AlreadyExists(key.to_string()));
        }

        let version = self.next_version();
        let replaced = shard
            .data
            .insert(key.to_string(), Versioned::new(value, version));
        trace!(key, version, replaced = replaced.is_some(), "create_row");
        Ok(version)
    }

    /// Whether a row for `key` is present.
    #[inline]
    pub fn does_row_exist(&self, key: &str) -> bool {
        self.read_shard(key).data.contains_key(key)
    }

    /// Current value for `key`, or `Error::NotFound`.
    pub fn get_row(&self, key: &str) -> Result<String> {
        self.get_row_versioned(key).map(Versioned::into_value)
    }

    /// Current value for `key` with its version, or `Error::NotFound`.
    pub fn get_row_versioned(&self, key: &str) -> Result<Versioned<String>> {
        let found = self.read_shard(key).data.get(key).cloned();
        match found {
            Some(row) => Ok(row),
            None => {
                trace!(key, "get_row miss");
                Err(Error::NotFound(key.to_string()))
            }
        }
    }

    /// Remove the row for `key`.
    ///
    /// Returns whether the row existed. Deleting an absent key is a no-op and
    /// still succeeds.
    pub fn delete_row(&self, key: &str) -> Result<bool> {
        let removed = self.write_shard(key).data.remove(key);
        trace!(key, existed = removed.is_some(), "delete_row");
        Ok(removed.is_some())
    }

    // ========================================================================
    // Whole-store operations
    // ========================================================================

    /// Total number of rows.
    ///
    /// Shards are visited one at a time, so under concurrent writes the
    /// count is not a point-in-time snapshot.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.read().is_empty())
    }

    /// All keys, sorted. Same consistency caveat as [`RowStore::len`].
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .shards
            .iter()
            .flat_map(|shard| shard.read().data.keys().cloned().collect::<Vec<_>>())
            .collect();
        keys.sort();
        keys
    }

    /// Remove every row. Versions keep increasing afterwards.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.write().data.clear();
        }
    }
}

impl Default for RowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStore")
            .field("shard_count", &self.shard_count())
            .field("policy", &self.policy)
            .field("version", &self.version())
            .field("total_entries", &self.len())
            .finish()
    }
}
