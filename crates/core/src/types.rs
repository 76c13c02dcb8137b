//! Core types for the row store
//!
//! - [`CreatePolicy`]: what `create_row` does when the key already exists
//! - [`Versioned`]: a value together with the version that installed it

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Duplicate-key policy for row creation.
///
/// The policy is fixed when a store is built and applies to every call site,
/// so concurrent creates of the same key always resolve the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatePolicy {
    /// Last create in the key's linearization wins; create never fails.
    #[default]
    Overwrite,
    /// Create on an existing key fails with `AlreadyExists` and leaves the
    /// stored row untouched.
    RejectExisting,
}

impl CreatePolicy {
    /// Whether a create against an existing key replaces it.
    pub fn overwrites(self) -> bool {
        matches!(self, CreatePolicy::Overwrite)
    }
}

impl std::fmt::Display for CreatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreatePolicy::Overwrite => write!(f, "overwrite"),
            CreatePolicy::RejectExisting => write!(f, "reject_existing"),
        }
    }
}

/// A value stamped with the version that installed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// The value
    pub value: T,
    /// Store-wide version allocated when the value was installed
    pub version: u64,
    /// Install time, microseconds since the Unix epoch
    pub timestamp: i64,
}

impl<T> Versioned<T> {
    /// Stamp `value` with `version` and the current time.
    pub fn new(value: T, version: u64) -> Self {
        Self {
            value,
            version,
            timestamp: Utc::now().timestamp_micros(),
        }
    }

    /// Drop the version information.
    pub fn into_value(self) -> T {
        self.value
    }
}
