//! Error types shared by every rowdb crate.
//!
//! Absence of a key is an ordinary outcome, so it travels as
//! [`Error::NotFound`] through `Result` like every other failure. Nothing in
//! the store panics on a miss.

use thiserror::Error;

/// All rowdb errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Read targeted a key that does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Create targeted an existing key under [`CreatePolicy::RejectExisting`]
    ///
    /// [`CreatePolicy::RejectExisting`]: crate::CreatePolicy::RejectExisting
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Key or account id failed validation
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Store configuration could not be parsed or is out of range
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A recorded history is impossible under every ordering of its calls.
    ///
    /// Produced by the linearizability checker. Any occurrence is a bug in
    /// the locking discipline, not a normal error path.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Result type for rowdb operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is an already-exists error.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists(_))
    }

    /// Check if this is a serious/unrecoverable error.
    pub fn is_serious(&self) -> bool {
        matches!(self, Error::InvariantViolation(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}
