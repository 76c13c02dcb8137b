//! Scenario drivers.
//!
//! A [`Scenario`] is a list of setup calls run one after another, followed by
//! a list of calls run concurrently. Two drivers execute it and return the
//! recorded [`History`]:
//!
//! - [`run_threads`]: one OS thread per concurrent call, released together
//!   by a barrier. Interleaving is up to the OS.
//! - [`run_schedule`] / [`drive`]: one task per call on a single-threaded
//!   tokio runtime. A [`Schedule`] seed fixes the spawn order and the number
//!   of yields around each store call, so the same seed replays the same
//!   interleaving.
//!
//! [`explore`] sweeps a range of seeds and checks each history.

use crate::checker::{CheckResult, LinearizabilityChecker, Validity};
use crate::error::{HarnessError, HarnessResult};
use crate::history::{History, Pid, Recorder};
use crate::ops::{Operation, YieldPlan};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rowdb_accounts::AccountManager;
use rowdb_core::Error;
use std::ops::Range;
use std::sync::{Arc, Barrier};
use std::thread;
use tracing::{debug, warn};

/// Setup calls followed by concurrent calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scenario {
    /// Run sequentially, in order, before anything concurrent
    pub setup: Vec<Operation>,
    /// Run concurrently after setup
    pub concurrent: Vec<Operation>,
}

impl Scenario {
    /// Create an empty scenario
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a setup call.
    pub fn setup(mut self, op: Operation) -> Self {
        self.setup.push(op);
        self
    }

    /// Append a concurrent call.
    pub fn concurrent(mut self, op: Operation) -> Self {
        self.concurrent.push(op);
        self
    }

    /// Append `n` copies of a concurrent call.
    pub fn concurrent_n(mut self, op: Operation, n: usize) -> Self {
        self.concurrent.extend(std::iter::repeat(op).take(n));
        self
    }
}

/// Seeded interleaving for the single-threaded driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// RNG seed; the same seed gives the same interleaving
    pub seed: u64,
    /// Upper bound on yields before and after each store call
    pub max_yields: usize,
}

impl Schedule {
    /// Schedule with the default yield bound.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            max_yields: DEFAULT_MAX_YIELDS,
        }
    }
}

/// Default bound on yields around each store call.
pub const DEFAULT_MAX_YIELDS: usize = 4;

fn record_setup(accounts: &AccountManager, recorder: &Recorder, setup: &[Operation]) {
    for op in setup {
        let call = recorder.invoke(Pid(0), op.clone());
        let outcome = op.apply(accounts);
        recorder.complete(call, Pid(0), outcome);
    }
}

/// Run the scenario on OS threads.
///
/// Setup calls are recorded as process 0; concurrent call `i` runs on its
/// own thread as process `i + 1`.
pub fn run_threads(accounts: &AccountManager, scenario: &Scenario) -> HarnessResult<History> {
    let recorder = Recorder::new();
    record_setup(accounts, &recorder, &scenario.setup);

    let barrier = Arc::new(Barrier::new(scenario.concurrent.len()));
    let handles: Vec<_> = scenario
        .concurrent
        .iter()
        .enumerate()
        .map(|(i, op)| {
            let accounts = accounts.clone();
            let recorder = recorder.clone();
            let barrier = Arc::clone(&barrier);
            let op = op.clone();
            let process = Pid(i as u64 + 1);
            thread::spawn(move || {
                barrier.wait();
                let call = recorder.invoke(process, op.clone());
                let outcome = op.apply(&accounts);
                recorder.complete(call, process, outcome);
            })
        })
        .collect();

    for h in handles {
        h.join().map_err(|_| HarnessError::ThreadPanicked)?;
    }
    Ok(recorder.history())
}

/// Run the scenario as tasks on the current tokio runtime.
///
/// Deterministic only on a current-thread runtime; on a multi-threaded
/// runtime the seed fixes spawn order and yields but not thread placement.
pub async fn drive(
    accounts: &AccountManager,
    scenario: &Scenario,
    schedule: Schedule,
) -> HarnessResult<History> {
    let mut rng = StdRng::seed_from_u64(schedule.seed);
    let recorder = Recorder::new();
    record_setup(accounts, &recorder, &scenario.setup);

    let mut order: Vec<usize> = (0..scenario.concurrent.len()).collect();
    order.shuffle(&mut rng);
    debug!(seed = schedule.seed, ?order, "driving schedule");

    let mut handles = Vec::with_capacity(order.len());
    for i in order {
        let plan = YieldPlan {
            before: rng.gen_range(0..=schedule.max_yields),
            after: rng.gen_range(0..=schedule.max_yields),
        };
        let op = scenario.concurrent[i].clone();
        handles.push(tokio::spawn(op.run(
            accounts.clone(),
            recorder.clone(),
            Pid(i as u64 + 1),
            plan,
        )));
    }

    for h in handles {
        h.await?;
    }
    Ok(recorder.history())
}

/// Run one schedule on a fresh single-threaded runtime.
pub fn run_schedule(
    accounts: &AccountManager,
    scenario: &Scenario,
    schedule: Schedule,
) -> HarnessResult<History> {
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    runtime.block_on(drive(accounts, scenario, schedule))
}

/// A schedule whose history failed the check.
#[derive(Debug, Clone)]
pub struct Failure {
    /// Schedule that reproduces the failure
    pub schedule: Schedule,
    /// Recorded history
    pub history: History,
    /// Checker verdict
    pub result: CheckResult,
}

/// Summary of a seed sweep.
#[derive(Debug, Clone)]
pub struct ExploreReport {
    /// Number of schedules run
    pub schedules_run: usize,
    /// Schedules whose check gave up with `Validity::Unknown`
    pub inconclusive: usize,
    /// First failing schedule, if any
    pub failure: Option<Failure>,
}

impl ExploreReport {
    /// Turn a failure into `Error::InvariantViolation`, naming the seed.
    ///
    /// Inconclusive schedules are not failures.
    pub fn into_result(self) -> HarnessResult<usize> {
        match self.failure {
            None => Ok(self.schedules_run),
            Some(failure) => Err(HarnessError::Store(Error::InvariantViolation(format!(
                "seed {} produced a non-linearizable history",
                failure.schedule.seed
            )))),
        }
    }
}

/// Run `scenario` once per seed, each against a fresh manager from
/// `factory`, stopping at the first history the checker proves invalid.
///
/// Histories the checker cannot decide are counted in
/// [`ExploreReport::inconclusive`] and the sweep continues.
pub fn explore<F>(
    factory: F,
    scenario: &Scenario,
    seeds: Range<u64>,
    max_yields: usize,
) -> HarnessResult<ExploreReport>
where
    F: Fn() -> AccountManager,
{
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let mut schedules_run = 0;
    let mut inconclusive = 0;

    for seed in seeds {
        let accounts = factory();
        let checker = LinearizabilityChecker::new(accounts.store().policy());
        let schedule = Schedule { seed, max_yields };
        let history = runtime.block_on(drive(&accounts, scenario, schedule))?;
        schedules_run += 1;

        let result = checker.check(&history);
        match result.valid {
            Validity::Valid => {}
            Validity::Unknown => {
                debug!(seed, "schedule check inconclusive");
                inconclusive += 1;
            }
            Validity::Invalid => {
                warn!(seed, "schedule failed linearizability check");
                return Ok(ExploreReport {
                    schedules_run,
                    inconclusive,
                    failure: Some(Failure {
                        schedule,
                        history,
                        result,
                    }),
                });
            }
        }
    }

    debug!(schedules_run, inconclusive, "exploration finished");
    Ok(ExploreReport {
        schedules_run,
        inconclusive,
        failure: None,
    })
}
