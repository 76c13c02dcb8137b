//! Concurrency Test Suite
//!
//! Concurrent calls into the row store and the account manager, judged by
//! direct assertions and by the linearizability checker.
//!
//! ## Running Tests
//!
//! ```bash
//! # Everything
//! cargo test --test concurrency
//!
//! # Seeded schedules only
//! cargo test --test concurrency schedules::
//! ```

use std::sync::Arc;

use rowdb::harness::{init_test_logging, History, LinearizabilityChecker};
use rowdb::{AccountManager, CreatePolicy, RowDb, RowStore};

pub mod properties;
pub mod rows;
pub mod schedules;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Fresh database with default settings
pub fn create_db() -> RowDb {
    init_test_logging();
    RowDb::new()
}

/// Fresh account manager over its own store
pub fn create_accounts() -> AccountManager {
    init_test_logging();
    AccountManager::new(Arc::new(RowStore::new()))
}

/// Fresh account manager over a store with the rejecting create policy
pub fn create_strict_accounts() -> AccountManager {
    init_test_logging();
    let store = RowStore::builder()
        .policy(CreatePolicy::RejectExisting)
        .build()
        .expect("default config with reject policy is valid");
    AccountManager::new(Arc::new(store))
}

/// Assert that `history` is linearizable under `policy`
pub fn assert_linearizable(history: &History, policy: CreatePolicy) {
    let result = LinearizabilityChecker::new(policy).check(history);
    assert!(
        result.is_valid(),
        "history not linearizable ({:?}):\n{}",
        result.valid,
        history.to_json().unwrap_or_default()
    );
}
