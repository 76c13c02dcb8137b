//! Harness errors.

use thiserror::Error;

/// Failures while driving or judging a scenario.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The single-threaded scheduler runtime could not be built
    #[error("failed to build scheduler runtime: {0}")]
    Runtime(#[from] std::io::Error),

    /// An operation task panicked or was cancelled
    #[error("operation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// An operation thread panicked
    #[error("operation thread panicked")]
    ThreadPanicked,

    /// A stored history could not be parsed
    #[error("history is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Store-level failure, including invariant violations found by the checker
    #[error(transparent)]
    Store(#[from] rowdb_core::Error),
}

/// Result type for harness operations.
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;
