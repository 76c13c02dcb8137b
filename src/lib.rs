//! # rowdb
//!
//! Concurrent in-memory row store with an account facade.
//!
//! Every per-key operation is linearizable: whatever interleaving a scheduler
//! picks, the observed results are those of some sequential order of the
//! calls on that key.
//!
//! ## Quick Start
//!
//! ```
//! use rowdb::prelude::*;
//!
//! let db = RowDb::new();
//!
//! // Row operations
//! db.rows.create_row("row1", "value1")?;
//! assert!(db.rows.does_row_exist("row1"));
//! assert_eq!(db.rows.get_row("row1")?, "value1");
//! db.rows.delete_row("row1")?;
//!
//! // Account operations, stored as rows keyed by account id
//! db.accounts.create_account("user1", "payload1")?;
//! assert_eq!(db.accounts.get_account("user1")?, "payload1");
//! db.accounts.delete_account("user1")?;
//!
//! // Absence is an ordinary result
//! assert!(db.accounts.get_account("user1").unwrap_err().is_not_found());
//! # Ok::<(), rowdb::Error>(())
//! ```
//!
//! ## Crates
//!
//! - [`RowStore`] - sharded key/value rows (`rowdb-storage`)
//! - [`AccountManager`] - account ids mapped onto rows (`rowdb-accounts`)
//! - [`harness`] - operation units, histories, and a linearizability checker
//!   for exploration tools (`rowdb-harness`)

#![warn(missing_docs)]

mod database;

pub mod prelude;

pub use database::{RowDb, RowDbBuilder};

pub use rowdb_accounts::AccountManager;
pub use rowdb_core::{CreatePolicy, Error, Result, Versioned};
pub use rowdb_storage::{RowStore, RowStoreBuilder, StoreConfig, DEFAULT_SHARDS, MAX_SHARDS};

/// Exploration harness re-export.
pub use rowdb_harness as harness;
