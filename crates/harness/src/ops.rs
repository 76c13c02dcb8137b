//! Callable and awaitable operation units.
//!
//! One [`Operation`] variant per public store or account operation. A
//! scheduler can run the same operation against the same key any number of
//! times concurrently; [`Operation::apply`] is the synchronous unit and
//! [`Operation::run`] the awaitable one.

use crate::history::{Pid, Recorder};
use rowdb_accounts::AccountManager;
use rowdb_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single call into the row store or the account manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// `RowStore::create_row`
    CreateRow {
        /// Row key
        key: String,
        /// Row value
        value: String,
    },
    /// `RowStore::does_row_exist`
    DoesRowExist {
        /// Row key
        key: String,
    },
    /// `RowStore::get_row`
    GetRow {
        /// Row key
        key: String,
    },
    /// `RowStore::delete_row`
    DeleteRow {
        /// Row key
        key: String,
    },
    /// `AccountManager::create_account`
    CreateAccount {
        /// Account id
        id: String,
        /// Account payload
        payload: String,
    },
    /// `AccountManager::get_account`
    GetAccount {
        /// Account id
        id: String,
    },
    /// `AccountManager::delete_account`
    DeleteAccount {
        /// Account id
        id: String,
    },
}

/// Observable result of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// Create installed its value
    Created,
    /// Create refused because the key exists
    Rejected,
    /// Existence check result
    Exists(bool),
    /// Read returned a value
    Value(String),
    /// Read found no row
    NotFound,
    /// Delete completed. `existed` is reported by row deletes only.
    Deleted {
        /// Whether a row was removed, when the call reports it
        existed: Option<bool>,
    },
    /// Call was refused before reaching the store
    Invalid(String),
}

impl Outcome {
    /// Whether an observed outcome agrees with the outcome a sequential
    /// model predicts. Validation messages are not compared.
    pub fn agrees_with(&self, expected: &Outcome) -> bool {
        match (self, expected) {
            (Outcome::Invalid(_), Outcome::Invalid(_)) => true,
            (observed, expected) => observed == expected,
        }
    }

    fn from_write(result: Result<()>) -> Self {
        match result {
            Ok(()) => Outcome::Created,
            Err(Error::AlreadyExists(_)) => Outcome::Rejected,
            Err(e) => Outcome::Invalid(e.to_string()),
        }
    }

    fn from_read(result: Result<String>) -> Self {
        match result {
            Ok(value) => Outcome::Value(value),
            Err(Error::NotFound(_)) => Outcome::NotFound,
            Err(e) => Outcome::Invalid(e.to_string()),
        }
    }
}

/// Yields to insert around the store call when running as a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YieldPlan {
    /// Yields between recording the invocation and calling the store
    pub before: usize,
    /// Yields between the store returning and recording the completion
    pub after: usize,
}

impl Operation {
    /// Build a `CreateRow`.
    pub fn create_row(key: impl Into<String>, value: impl Into<String>) -> Self {
        Operation::CreateRow {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build a `DoesRowExist`.
    pub fn does_row_exist(key: impl Into<String>) -> Self {
        Operation::DoesRowExist { key: key.into() }
    }

    /// Build a `GetRow`.
    pub fn get_row(key: impl Into<String>) -> Self {
        Operation::GetRow { key: key.into() }
    }

    /// Build a `DeleteRow`.
    pub fn delete_row(key: impl Into<String>) -> Self {
        Operation::DeleteRow { key: key.into() }
    }

    /// Build a `CreateAccount`.
    pub fn create_account(id: impl Into<String>, payload: impl Into<String>) -> Self {
        Operation::CreateAccount {
            id: id.into(),
            payload: payload.into(),
        }
    }

    /// Build a `GetAccount`.
    pub fn get_account(id: impl Into<String>) -> Self {
        Operation::GetAccount { id: id.into() }
    }

    /// Build a `DeleteAccount`.
    pub fn delete_account(id: impl Into<String>) -> Self {
        Operation::DeleteAccount { id: id.into() }
    }

    /// Row key this operation targets. Account ids map to identical keys.
    pub fn key(&self) -> &str {
        match self {
            Operation::CreateRow { key, .. }
            | Operation::DoesRowExist { key }
            | Operation::GetRow { key }
            | Operation::DeleteRow { key } => key,
            Operation::CreateAccount { id, .. }
            | Operation::GetAccount { id }
            | Operation::DeleteAccount { id } => id,
        }
    }

    /// Whether the operation can change the stored row.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Operation::CreateRow { .. }
                | Operation::DeleteRow { .. }
                | Operation::CreateAccount { .. }
                | Operation::DeleteAccount { .. }
        )
    }

    /// Run the operation to completion on the calling thread.
    pub fn apply(&self, accounts: &AccountManager) -> Outcome {
        let store = accounts.store();
        match self {
            Operation::CreateRow { key, value } => {
                Outcome::from_write(store.create_row(key, value.as_str()).map(|_| ()))
            }
            Operation::DoesRowExist { key } => Outcome::Exists(store.does_row_exist(key)),
            Operation::GetRow { key } => Outcome::from_read(store.get_row(key)),
            Operation::DeleteRow { key } => match store.delete_row(key) {
                Ok(existed) => Outcome::Deleted {
                    existed: Some(existed),
                },
                Err(e) => Outcome::Invalid(e.to_string()),
            },
            Operation::CreateAccount { id, payload } => {
                Outcome::from_write(accounts.create_account(id, payload.as_str()))
            }
            Operation::GetAccount { id } => Outcome::from_read(accounts.get_account(id)),
            Operation::DeleteAccount { id } => match accounts.delete_account(id) {
                Ok(()) => Outcome::Deleted { existed: None },
                Err(e) => Outcome::Invalid(e.to_string()),
            },
        }
    }

    /// Run the operation as an awaitable unit, recording it in `recorder`.
    ///
    /// The invocation is recorded first, then the task yields `plan.before`
    /// times, calls the store, yields `plan.after` times, and records the
    /// completion. The yields are where a scheduler interleaves other tasks.
    pub async fn run(
        self,
        accounts: AccountManager,
        recorder: Recorder,
        process: Pid,
        plan: YieldPlan,
    ) -> Outcome {
        let call = recorder.invoke(process, self.clone());
        for _ in 0..plan.before {
            tokio::task::yield_now().await;
        }
        let outcome = self.apply(&accounts);
        for _ in 0..plan.after {
            tokio::task::yield_now().await;
        }
        recorder.complete(call, process, outcome.clone());
        outcome
    }
}
