//! Concurrency exploration scaffolding for rowdb
//!
//! An external exploration tool drives many interleavings of store and
//! account calls and needs three things from the code under test:
//!
//! - callable and awaitable operation units ([`Operation`])
//! - a record of what happened ([`History`], [`Recorder`])
//! - a verdict ([`LinearizabilityChecker`])
//!
//! [`run_threads`], [`run_schedule`], and [`explore`] are ready-made drivers.
//!
//! # Quick Start
//!
//! ```
//! use rowdb_accounts::AccountManager;
//! use rowdb_harness::{run_threads, LinearizabilityChecker, Operation, Scenario};
//! use rowdb_storage::RowStore;
//! use std::sync::Arc;
//!
//! let accounts = AccountManager::new(Arc::new(RowStore::new()));
//! let scenario = Scenario::new()
//!     .concurrent(Operation::create_account("user1", "payload1"))
//!     .concurrent(Operation::create_account("user1", "payload2"));
//!
//! let history = run_threads(&accounts, &scenario).unwrap();
//! let result = LinearizabilityChecker::default().check(&history);
//! assert!(result.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checker;
pub mod driver;
pub mod error;
pub mod history;
pub mod ops;

pub use checker::{
    CheckResult, KeyReport, LinearizabilityChecker, Validity, DEFAULT_STEP_BUDGET, MAX_CALLS_PER_KEY,
};
pub use driver::{
    drive, explore, run_schedule, run_threads, ExploreReport, Failure, Scenario, Schedule,
    DEFAULT_MAX_YIELDS,
};
pub use error::{HarnessError, HarnessResult};
pub use history::{Call, CallId, Event, EventKind, History, Pid, Recorder};
pub use ops::{Operation, Outcome, YieldPlan};

/// Install a `tracing` subscriber that writes into the test output capture.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
