//! Convenient imports for rowdb.
//!
//! ```
//! use rowdb::prelude::*;
//!
//! let db = RowDb::new();
//! db.rows.create_row("key", "value")?;
//! # Ok::<(), rowdb::Error>(())
//! ```

// Main entry point
pub use crate::database::{RowDb, RowDbBuilder};

// Error handling
pub use crate::{Error, Result};

// Store and facade
pub use crate::{AccountManager, RowStore, RowStoreBuilder, StoreConfig};

// Core types
pub use crate::{CreatePolicy, Versioned};
