//! Account facade over the row store
//!
//! ## Desugaring
//!
//! | Account | Row store |
//! |---------|-----------|
//! | `create_account(id, payload)` | `create_row(id, payload)` |
//! | `get_account(id)` | `get_row(id)` |
//! | `delete_account(id)` | `delete_row(id)` |
//! | `account_exists(id)` | `does_row_exist(id)` |
//!
//! Empty ids are rejected with `Error::InvalidKey` before delegation.
//! Every other id is used verbatim as the row key.

use rowdb_core::{Error, Result};
use rowdb_storage::RowStore;
use std::sync::Arc;
use tracing::debug;

/// Account operations on top of a shared [`RowStore`].
///
/// Cloning is cheap and every clone talks to the same store.
///
/// # Example
///
/// ```
/// use rowdb_accounts::AccountManager;
/// use rowdb_storage::RowStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(RowStore::new());
/// let manager = AccountManager::new(Arc::clone(&store));
///
/// manager.create_account("user1", "payload1").unwrap();
/// assert_eq!(manager.get_account("user1").unwrap(), "payload1");
///
/// // Accounts are plain rows
/// assert!(store.does_row_exist("user1"));
///
/// manager.delete_account("user1").unwrap();
/// manager.delete_account("user1").unwrap();
/// assert!(manager.get_account("user1").unwrap_err().is_not_found());
/// ```
#[derive(Debug, Clone)]
pub struct AccountManager {
    store: Arc<RowStore>,
}

impl AccountManager {
    /// Wrap a shared store.
    pub fn new(store: Arc<RowStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<RowStore> {
        &self.store
    }

    fn validate_id(id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidKey("account id must not be empty".into()));
        }
        Ok(())
    }

    /// Create an account, or replace its payload under the store's
    /// overwrite policy.
    ///
    /// Concurrent creates of the same id both succeed under
    /// `CreatePolicy::Overwrite`; the stored payload is exactly one of the
    /// submitted payloads.
    pub fn create_account(&self, id: &str, payload: impl Into<String>) -> Result<()> {
        Self::validate_id(id)?;
        let version = self.store.create_row(id, payload)?;
        debug!(account = id, version, "account created");
        Ok(())
    }

    /// Payload of the account, or `Error::NotFound`.
    pub fn get_account(&self, id: &str) -> Result<String> {
        Self::validate_id(id)?;
        self.store.get_row(id)
    }

    /// Delete the account. Succeeds whether or not it existed.
    pub fn delete_account(&self, id: &str) -> Result<()> {
        Self::validate_id(id)?;
        let existed = self.store.delete_row(id)?;
        debug!(account = id, existed, "account deleted");
        Ok(())
    }

    /// Whether the account exists.
    pub fn account_exists(&self, id: &str) -> Result<bool> {
        Self::validate_id(id)?;
        Ok(self.store.does_row_exist(id))
    }
}
