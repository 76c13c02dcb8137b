//! Core types for rowdb
//!
//! Shared by the storage, accounts, and harness crates:
//! - [`Error`] / [`Result`]: the error taxonomy
//! - [`CreatePolicy`]: duplicate-key behaviour of `create_row`
//! - [`Versioned`]: values stamped with their install version

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{CreatePolicy, Versioned};
