//! Per-key linearizability checker.
//!
//! Operations on different keys are unordered, so a history is checked one
//! key at a time. For each key the checker searches for a total order of the
//! key's calls that
//!
//! - respects real time: a call that completed before another was invoked
//!   comes first, and
//! - reproduces every observed outcome when replayed against a sequential
//!   model of one key under the store's [`CreatePolicy`].
//!
//! The search is Wing & Gong's: repeatedly pick a call that no remaining
//! call must precede, step the model, and backtrack on a mismatch. Visited
//! `(remaining calls, model state)` pairs are memoised. Calls that never
//! completed may be placed anywhere after their invocation or left out.
//!
//! The search is exponential in the number of overlapping calls, so each key
//! gets a budget of model steps. A key that exhausts it is `Unknown`.

use crate::history::{Call, CallId, History};
use crate::ops::{Operation, Outcome};
use rowdb_core::{CreatePolicy, Error, Result};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Largest number of calls on one key the checker will search.
pub const MAX_CALLS_PER_KEY: usize = 64;

/// Model steps the search may take on one key before giving up.
pub const DEFAULT_STEP_BUDGET: usize = 200_000;

/// Validity status of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Some total order explains every outcome
    Valid,
    /// No total order explains the outcomes
    Invalid,
    /// Too many calls, or the step budget ran out
    Unknown,
}

impl Validity {
    fn merge(self, other: Validity) -> Validity {
        match (self, other) {
            (Validity::Invalid, _) | (_, Validity::Invalid) => Validity::Invalid,
            (Validity::Unknown, _) | (_, Validity::Unknown) => Validity::Unknown,
            _ => Validity::Valid,
        }
    }
}

/// Result for one key.
#[derive(Debug, Clone)]
pub struct KeyReport {
    /// Row key
    pub key: String,
    /// Outcome of the search
    pub validity: Validity,
    /// Number of calls on this key
    pub calls: usize,
    /// A witness order when valid
    pub linearization: Option<Vec<CallId>>,
}

/// Result of checking a whole history.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Combined validity: invalid if any key is, else unknown if any key is
    pub valid: Validity,
    /// Per-key results, sorted by key
    pub keys: Vec<KeyReport>,
}

impl CheckResult {
    /// Whether every key was proven linearizable.
    pub fn is_valid(&self) -> bool {
        self.valid == Validity::Valid
    }

    /// Keys with no valid linearization.
    pub fn invalid_keys(&self) -> impl Iterator<Item = &str> {
        self.keys
            .iter()
            .filter(|k| k.validity == Validity::Invalid)
            .map(|k| k.key.as_str())
    }

    /// Turn an invalid result into `Error::InvariantViolation`.
    pub fn into_result(self) -> Result<CheckResult> {
        if self.valid == Validity::Invalid {
            let keys: Vec<&str> = self.invalid_keys().collect();
            return Err(Error::InvariantViolation(format!(
                "no linearization for keys {:?}",
                keys
            )));
        }
        Ok(self)
    }
}

/// Sequential model of a single key.
#[derive(Debug, Clone, Copy)]
struct KeyModel {
    policy: CreatePolicy,
}

impl KeyModel {
    /// Apply `op` to `state`, returning the new state and expected outcome.
    fn step(&self, state: &Option<String>, op: &Operation) -> (Option<String>, Outcome) {
        match op {
            Operation::CreateAccount { id, .. }
            | Operation::GetAccount { id }
            | Operation::DeleteAccount { id }
                if id.is_empty() =>
            {
                (state.clone(), Outcome::Invalid(String::new()))
            }
            Operation::CreateRow { value, .. } | Operation::CreateAccount { payload: value, .. } => {
                if state.is_some() && !self.policy.overwrites() {
                    (state.clone(), Outcome::Rejected)
                } else {
                    (Some(value.clone()), Outcome::Created)
                }
            }
            Operation::DoesRowExist { .. } => (state.clone(), Outcome::Exists(state.is_some())),
            Operation::GetRow { .. } | Operation::GetAccount { .. } => {
                let outcome = match state {
                    Some(v) => Outcome::Value(v.clone()),
                    None => Outcome::NotFound,
                };
                (state.clone(), outcome)
            }
            Operation::DeleteRow { .. } => (
                None,
                Outcome::Deleted {
                    existed: Some(state.is_some()),
                },
            ),
            Operation::DeleteAccount { .. } => (None, Outcome::Deleted { existed: None }),
        }
    }
}

/// Checks recorded histories against the row store's contracts.
#[derive(Debug, Clone)]
pub struct LinearizabilityChecker {
    policy: CreatePolicy,
    step_budget: usize,
}

impl Default for LinearizabilityChecker {
    fn default() -> Self {
        Self::new(CreatePolicy::default())
    }
}

impl LinearizabilityChecker {
    /// Checker for a store built with `policy`.
    pub fn new(policy: CreatePolicy) -> Self {
        Self {
            policy,
            step_budget: DEFAULT_STEP_BUDGET,
        }
    }

    /// Set the per-key step budget.
    pub fn with_step_budget(mut self, steps: usize) -> Self {
        self.step_budget = steps;
        self
    }

    /// Check every key in `history`. Every key starts absent.
    pub fn check(&self, history: &History) -> CheckResult {
        let mut by_key: BTreeMap<String, Vec<Call>> = BTreeMap::new();
        for call in history.calls() {
            by_key.entry(call.op.key().to_string()).or_default().push(call);
        }

        let mut valid = Validity::Valid;
        let keys: Vec<KeyReport> = by_key
            .into_iter()
            .map(|(key, calls)| {
                let report = self.check_key(key, &calls);
                if report.validity == Validity::Invalid {
                    warn!(key = %report.key, calls = report.calls, "history not linearizable");
                }
                valid = valid.merge(report.validity);
                report
            })
            .collect();

        CheckResult { valid, keys }
    }

    fn check_key(&self, key: String, calls: &[Call]) -> KeyReport {
        // Pending reads constrain nothing
        let calls: Vec<&Call> = calls
            .iter()
            .filter(|c| c.outcome.is_some() || c.op.is_mutation())
            .collect();

        if calls.len() > MAX_CALLS_PER_KEY {
            return KeyReport {
                key,
                validity: Validity::Unknown,
                calls: calls.len(),
                linearization: None,
            };
        }

        let mut search = Search {
            model: KeyModel {
                policy: self.policy,
            },
            calls: &calls,
            visited: HashSet::new(),
            order: Vec::with_capacity(calls.len()),
            budget: self.step_budget,
        };
        let all: u64 = if calls.is_empty() {
            0
        } else {
            u64::MAX >> (64 - calls.len())
        };
        let validity = match search.run(all, None) {
            Some(true) => Validity::Valid,
            Some(false) => Validity::Invalid,
            None => {
                debug!(key = %key, calls = calls.len(), "step budget exhausted");
                Validity::Unknown
            }
        };

        KeyReport {
            key,
            validity,
            calls: calls.len(),
            linearization: (validity == Validity::Valid)
                .then(|| search.order.iter().map(|&i| calls[i].id).collect()),
        }
    }
}

struct Search<'a> {
    model: KeyModel,
    calls: &'a [&'a Call],
    visited: HashSet<(u64, Option<String>)>,
    order: Vec<usize>,
    /// Model steps left
    budget: usize,
}

impl Search<'_> {
    fn required(&self, remaining: u64) -> u64 {
        let mut mask = 0;
        for (i, call) in self.calls.iter().enumerate() {
            if remaining & (1 << i) != 0 && call.completed_at.is_some() {
                mask |= 1 << i;
            }
        }
        mask
    }

    /// `Some(found)` once decided, `None` when the budget runs out.
    fn run(&mut self, remaining: u64, state: Option<String>) -> Option<bool> {
        if self.required(remaining) == 0 {
            return Some(true);
        }
        if !self.visited.insert((remaining, state.clone())) {
            return Some(false);
        }

        // A call may go next only if no remaining call completed before it
        // was invoked.
        let horizon = (0..self.calls.len())
            .filter(|i| remaining & (1 << i) != 0)
            .filter_map(|i| self.calls[i].completed_at)
            .min()
            .unwrap_or(usize::MAX);

        for i in 0..self.calls.len() {
            if remaining & (1 << i) == 0 {
                continue;
            }
            let call = self.calls[i];
            if call.invoked_at > horizon {
                continue;
            }
            if self.budget == 0 {
                return None;
            }
            self.budget -= 1;
            let (next, expected) = self.model.step(&state, &call.op);
            let consistent = match &call.outcome {
                Some(observed) => observed.agrees_with(&expected),
                None => true,
            };
            if !consistent {
                continue;
            }
            self.order.push(i);
            match self.run(remaining & !(1 << i), next) {
                Some(false) => {}
                decided => return decided,
            }
            self.order.pop();
        }
        Some(false)
    }
}
