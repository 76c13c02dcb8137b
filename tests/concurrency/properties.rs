//! Property Tests
//!
//! Random mixes of operations over a few keys, run on threads and as seeded
//! tasks, must always produce linearizable histories.

use crate::*;
use proptest::prelude::*;
use rowdb::harness::{run_schedule, run_threads, Operation, Scenario, Schedule};

fn operation() -> impl Strategy<Value = Operation> {
    let key = prop_oneof![Just("a"), Just("b")];
    let value = prop_oneof![Just("v1"), Just("v2"), Just("v3")];
    (0u8..7, key, value).prop_map(|(kind, key, value)| match kind {
        0 => Operation::create_row(key, value),
        1 => Operation::does_row_exist(key),
        2 => Operation::get_row(key),
        3 => Operation::delete_row(key),
        4 => Operation::create_account(key, value),
        5 => Operation::get_account(key),
        _ => Operation::delete_account(key),
    })
}

fn scenario() -> impl Strategy<Value = Scenario> {
    (
        prop::collection::vec(operation(), 0..3),
        prop::collection::vec(operation(), 1..7),
    )
        .prop_map(|(setup, concurrent)| Scenario { setup, concurrent })
}

fn policy() -> impl Strategy<Value = CreatePolicy> {
    prop_oneof![Just(CreatePolicy::Overwrite), Just(CreatePolicy::RejectExisting)]
}

fn accounts_with(policy: CreatePolicy) -> AccountManager {
    let store = RowStore::builder()
        .policy(policy)
        .build()
        .expect("default config is valid");
    AccountManager::new(Arc::new(store))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn threaded_histories_are_linearizable(scenario in scenario(), policy in policy()) {
        let accounts = accounts_with(policy);
        let history = run_threads(&accounts, &scenario).unwrap();
        assert_linearizable(&history, policy);
    }

    #[test]
    fn scheduled_histories_are_linearizable(scenario in scenario(), policy in policy(), seed in any::<u64>()) {
        let accounts = accounts_with(policy);
        let history = run_schedule(&accounts, &scenario, Schedule::seeded(seed)).unwrap();
        assert_linearizable(&history, policy);
    }
}
