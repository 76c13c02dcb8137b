//! Seeded Schedule Tests
//!
//! The original scenarios run as tasks on a single-threaded runtime under
//! many seeds. Each seed is a replayable interleaving.

use crate::*;
use rowdb::harness::{
    drive, explore, run_schedule, Operation, Outcome, Scenario, Schedule, DEFAULT_MAX_YIELDS,
    MAX_CALLS_PER_KEY,
};

const SEEDS: std::ops::Range<u64> = 0..200;

fn assert_explored_clean(scenario: &Scenario) {
    let report = explore(create_accounts, scenario, SEEDS, DEFAULT_MAX_YIELDS).unwrap();
    if let Some(failure) = &report.failure {
        panic!(
            "seed {} failed:\n{}",
            failure.schedule.seed,
            failure.history.to_json().unwrap_or_default()
        );
    }
    assert_eq!(report.schedules_run, (SEEDS.end - SEEDS.start) as usize);
    assert_eq!(report.inconclusive, 0);
}

#[test]
fn explore_concurrent_create_account() {
    assert_explored_clean(
        &Scenario::new()
            .concurrent(Operation::create_account("user1", "payload1"))
            .concurrent(Operation::create_account("user1", "payload2"))
            .concurrent(Operation::get_account("user1")),
    );
}

#[test]
fn explore_concurrent_get_account() {
    assert_explored_clean(
        &Scenario::new()
            .setup(Operation::create_account("user1", "payload1"))
            .concurrent_n(Operation::get_account("user1"), 2),
    );
}

#[test]
fn explore_concurrent_delete_account() {
    assert_explored_clean(
        &Scenario::new()
            .setup(Operation::create_account("user1", "payload1"))
            .concurrent_n(Operation::delete_account("user1"), 2)
            .concurrent(Operation::get_account("user1")),
    );
}

#[test]
fn explore_concurrent_create_row() {
    assert_explored_clean(
        &Scenario::new()
            .concurrent(Operation::create_row("row1", "value1"))
            .concurrent(Operation::create_row("row1", "value2"))
            .concurrent(Operation::does_row_exist("row1")),
    );
}

#[test]
fn explore_concurrent_does_row_exist() {
    assert_explored_clean(
        &Scenario::new()
            .setup(Operation::create_row("row1", "value1"))
            .concurrent_n(Operation::does_row_exist("row1"), 2),
    );
}

#[test]
fn explore_concurrent_get_row() {
    assert_explored_clean(
        &Scenario::new()
            .setup(Operation::create_row("row1", "value1"))
            .concurrent_n(Operation::get_row("row1"), 2),
    );
}

#[test]
fn explore_concurrent_delete_row() {
    assert_explored_clean(
        &Scenario::new()
            .setup(Operation::create_row("row1", "value1"))
            .concurrent_n(Operation::delete_row("row1"), 2)
            .concurrent(Operation::does_row_exist("row1")),
    );
}

#[test]
fn explore_strict_policy() {
    let scenario = Scenario::new()
        .concurrent(Operation::create_row("k", "a"))
        .concurrent(Operation::create_row("k", "b"))
        .concurrent(Operation::delete_row("k"))
        .concurrent(Operation::get_row("k"));
    let report = explore(create_strict_accounts, &scenario, SEEDS, DEFAULT_MAX_YIELDS).unwrap();
    assert!(report.failure.is_none());
}

#[test]
fn explore_undecidable_scenario_is_inconclusive_not_failed() {
    let scenario = Scenario::new()
        .setup(Operation::create_account("user1", "payload1"))
        .concurrent_n(Operation::get_account("user1"), MAX_CALLS_PER_KEY + 6);

    let report = explore(create_accounts, &scenario, 0..8, DEFAULT_MAX_YIELDS).unwrap();
    assert!(report.failure.is_none());
    assert_eq!(report.inconclusive, 8);
    assert_eq!(report.into_result().unwrap(), 8);
}

#[test]
fn seed_replays_identically() {
    let scenario = Scenario::new()
        .setup(Operation::create_row("row1", "value1"))
        .concurrent(Operation::delete_row("row1"))
        .concurrent(Operation::create_row("row1", "value2"))
        .concurrent(Operation::get_row("row1"));

    let schedule = Schedule::seeded(42);
    let first = run_schedule(&create_accounts(), &scenario, schedule).unwrap();
    let replay = run_schedule(&create_accounts(), &scenario, schedule).unwrap();
    assert_eq!(first, replay);

    // A stored history reloads to the same calls
    let reloaded = rowdb::harness::History::from_json(&first.to_json().unwrap()).unwrap();
    assert_eq!(reloaded.calls(), first.calls());
}

#[tokio::test(flavor = "current_thread")]
async fn awaitable_units_inside_caller_runtime() {
    let accounts = create_accounts();
    let scenario = Scenario::new()
        .setup(Operation::create_account("user1", "payload1"))
        .concurrent_n(Operation::get_account("user1"), 2);

    let history = drive(&accounts, &scenario, Schedule::seeded(7)).await.unwrap();
    for call in history.calls().into_iter().skip(1) {
        assert_eq!(call.outcome, Some(Outcome::Value("payload1".into())));
    }
    assert_linearizable(&history, CreatePolicy::Overwrite);
}
