//! Main entry point for rowdb.
//!
//! [`RowDb`] owns one shared [`RowStore`] and an [`AccountManager`] over it.
//! Construct one per process or test fixture and pass it (or clones of its
//! handles) to every caller; there is no global instance.

use crate::{AccountManager, CreatePolicy, Result, RowStore, RowStoreBuilder, StoreConfig};
use std::sync::Arc;

/// A row store together with its account facade.
///
/// # Example
///
/// ```
/// use rowdb::prelude::*;
///
/// let db = RowDb::new();
///
/// db.rows.create_row("row1", "value1")?;
/// db.accounts.create_account("user1", "payload1")?;
///
/// assert_eq!(db.rows.get_row("user1")?, "payload1");
/// assert_eq!(db.accounts.get_account("row1")?, "value1");
/// # Ok::<(), rowdb::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct RowDb {
    /// Row-level operations
    pub rows: Arc<RowStore>,

    /// Account-level operations over the same rows
    pub accounts: AccountManager,
}

impl RowDb {
    /// Create a database with default settings (16 shards, overwrite policy).
    pub fn new() -> Self {
        Self::from_store(RowStore::new())
    }

    /// Create a builder for database configuration.
    ///
    /// ```
    /// use rowdb::prelude::*;
    ///
    /// let db = RowDb::builder()
    ///     .shards(4)
    ///     .policy(CreatePolicy::RejectExisting)
    ///     .open()?;
    /// assert_eq!(db.rows.shard_count(), 4);
    /// # Ok::<(), rowdb::Error>(())
    /// ```
    pub fn builder() -> RowDbBuilder {
        RowDbBuilder::new()
    }

    /// Create a database from TOML configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config = StoreConfig::from_toml_str(text)?;
        RowDbBuilder::from_config(config).open()
    }

    fn from_store(store: RowStore) -> Self {
        let rows = Arc::new(store);
        Self {
            accounts: AccountManager::new(Arc::clone(&rows)),
            rows,
        }
    }
}

impl Default for RowDb {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`RowDb`].
#[derive(Debug, Clone, Default)]
pub struct RowDbBuilder {
    inner: RowStoreBuilder,
}

impl RowDbBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing store configuration.
    pub fn from_config(config: StoreConfig) -> Self {
        Self {
            inner: RowStoreBuilder::from_config(config),
        }
    }

    /// Set the number of lock shards.
    pub fn shards(mut self, shards: usize) -> Self {
        self.inner = self.inner.shards(shards);
        self
    }

    /// Serialize every key behind one lock.
    pub fn single_lock(mut self) -> Self {
        self.inner = self.inner.single_lock();
        self
    }

    /// Set the duplicate-key policy.
    pub fn policy(mut self, policy: CreatePolicy) -> Self {
        self.inner = self.inner.policy(policy);
        self
    }

    /// Validate the configuration and open the database.
    pub fn open(self) -> Result<RowDb> {
        Ok(RowDb::from_store(self.inner.build()?))
    }
}
