//! Storage layer for rowdb
//!
//! This crate implements the row store:
//! - RowStore: FxHashMap shards, one RwLock per shard
//! - Per-key atomic create / exists / get / delete
//! - Store-wide version counter (AtomicU64)
//! - StoreConfig / RowStoreBuilder for shard count and duplicate-key policy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod sharded;
mod sync;

pub use config::{RowStoreBuilder, StoreConfig, DEFAULT_SHARDS, MAX_SHARDS};
pub use sharded::RowStore;

pub use rowdb_core::{CreatePolicy, Error, Result, Versioned};
