//! Account management for rowdb
//!
//! [`AccountManager`] maps account ids one-to-one onto row keys of a shared
//! [`RowStore`](rowdb_storage::RowStore). It keeps no state and takes no
//! locks of its own, so every account operation inherits the atomicity of
//! the single row operation it delegates to.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;

pub use manager::AccountManager;
