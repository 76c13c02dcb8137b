//! History representation for linearizability checking.
//!
//! Calls follow a request/response model:
//! - `Invoke` marks the start of a call
//! - `Complete` marks its return, carrying the observed [`Outcome`]
//!
//! Every event gets a global index at the moment it is recorded. If call A's
//! `Complete` index is below call B's `Invoke` index, A finished before B
//! started and any linearization must order A first.

use crate::ops::{Operation, Outcome};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Process, thread, or task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Pid(pub u64);

impl From<u64> for Pid {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifier pairing an invocation with its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallId(pub usize);

/// What an event records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Call started
    Invoke(Operation),
    /// Call returned
    Complete(Outcome),
}

/// A single entry in a history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Position in the history
    pub index: usize,
    /// Which call this event belongs to
    pub call: CallId,
    /// Who made the call
    pub process: Pid,
    /// Invoke or complete
    pub kind: EventKind,
}

/// A call with both of its events resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Call identifier
    pub id: CallId,
    /// Who made the call
    pub process: Pid,
    /// What was called
    pub op: Operation,
    /// What it returned, `None` if it never completed
    pub outcome: Option<Outcome>,
    /// Index of the invoke event
    pub invoked_at: usize,
    /// Index of the complete event
    pub completed_at: Option<usize>,
}

/// Ordered list of events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    events: Vec<Event>,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, assigning it the next index.
    pub fn push(&mut self, call: CallId, process: Pid, kind: EventKind) -> usize {
        let index = self.events.len();
        self.events.push(Event {
            index,
            call,
            process,
            kind,
        });
        index
    }

    /// All events in order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events were recorded
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Pair invocations with completions, ordered by invocation.
    ///
    /// Completions without a matching invocation are ignored.
    pub fn calls(&self) -> Vec<Call> {
        let mut calls: BTreeMap<CallId, Call> = BTreeMap::new();
        for event in &self.events {
            match &event.kind {
                EventKind::Invoke(op) => {
                    calls.insert(
                        event.call,
                        Call {
                            id: event.call,
                            process: event.process,
                            op: op.clone(),
                            outcome: None,
                            invoked_at: event.index,
                            completed_at: None,
                        },
                    );
                }
                EventKind::Complete(outcome) => {
                    if let Some(call) = calls.get_mut(&event.call) {
                        call.outcome = Some(outcome.clone());
                        call.completed_at = Some(event.index);
                    }
                }
            }
        }
        let mut calls: Vec<Call> = calls.into_values().collect();
        calls.sort_by_key(|c| c.invoked_at);
        calls
    }

    /// Serialize to JSON, e.g. to keep a failing schedule for replay.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a history written by [`History::to_json`].
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Thread-safe, cloneable history writer.
///
/// The event index is assigned under the recorder's lock, so indices follow
/// real time across threads.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    inner: Arc<Mutex<RecorderState>>,
}

#[derive(Debug, Default)]
struct RecorderState {
    history: History,
    next_call: usize,
}

impl Recorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a call.
    pub fn invoke(&self, process: Pid, op: Operation) -> CallId {
        let mut state = self.inner.lock();
        let call = CallId(state.next_call);
        state.next_call += 1;
        state.history.push(call, process, EventKind::Invoke(op));
        call
    }

    /// Record the return of a call.
    pub fn complete(&self, call: CallId, process: Pid, outcome: Outcome) {
        self.inner
            .lock()
            .history
            .push(call, process, EventKind::Complete(outcome));
    }

    /// Copy of everything recorded so far.
    pub fn history(&self) -> History {
        self.inner.lock().history.clone()
    }
}
