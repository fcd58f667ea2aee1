//! Reference model of the database.
//!
//! The model keeps a full copy of the visible key space per open
//! transaction, so every operation is trivially correct and easy to
//! compare against the layered engine.

use crate::generators::Operation;
use memdb_core::{CoreError, Database};
use std::collections::HashMap;

/// Observable result of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The operation has no result.
    Done,
    /// Result of a read; `None` for absent keys.
    Value(Option<String>),
    /// Result of a value count.
    Count(u64),
    /// Commit or rollback outside a transaction.
    NoTransaction,
}

/// Snapshot-stack model.
#[derive(Debug, Clone)]
pub struct Model {
    stack: Vec<HashMap<String, String>>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Creates an empty model with no open transaction.
    pub fn new() -> Self {
        Self {
            stack: vec![HashMap::new()],
        }
    }

    /// Number of open transactions.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    fn top(&self) -> &HashMap<String, String> {
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut HashMap<String, String> {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// Applies one operation.
    pub fn apply(&mut self, op: &Operation) -> Outcome {
        match op {
            Operation::Set { key, value } => {
                self.top_mut().insert(key.clone(), value.clone());
                Outcome::Done
            }
            Operation::Unset { key } => {
                self.top_mut().remove(key);
                Outcome::Done
            }
            Operation::Get { key } => Outcome::Value(self.top().get(key).cloned()),
            Operation::NumEqualTo { value } => {
                Outcome::Count(self.top().values().filter(|v| *v == value).count() as u64)
            }
            Operation::Begin => {
                let snapshot = self.top().clone();
                self.stack.push(snapshot);
                Outcome::Done
            }
            Operation::Commit => {
                if self.depth() == 0 {
                    return Outcome::NoTransaction;
                }
                let top = self.stack.pop().unwrap_or_default();
                self.stack = vec![top];
                Outcome::Done
            }
            Operation::Rollback => {
                if self.depth() == 0 {
                    return Outcome::NoTransaction;
                }
                self.stack.pop();
                Outcome::Done
            }
        }
    }
}

/// Applies `op` to the engine, moving `scope` like a client would.
///
/// # Panics
///
/// Panics on errors a single client can never cause, such as a commit
/// conflict.
pub fn apply_to_database(scope: &mut Database, op: &Operation) -> Outcome {
    let moved = match op {
        Operation::Set { key, value } => {
            scope.set(key.as_str(), value.as_str());
            return Outcome::Done;
        }
        Operation::Unset { key } => {
            scope.unset(key.as_str());
            return Outcome::Done;
        }
        Operation::Get { key } => {
            return match scope.get(key) {
                Ok(value) => Outcome::Value(Some(value)),
                Err(CoreError::NotFound { .. }) => Outcome::Value(None),
                Err(err) => panic!("unexpected read error: {err}"),
            }
        }
        Operation::NumEqualTo { value } => return Outcome::Count(scope.num_equal_to(value)),
        Operation::Begin => Ok(scope.begin()),
        Operation::Commit => scope.commit(),
        Operation::Rollback => scope.rollback(),
    };

    match moved {
        Ok(next) => {
            *scope = next;
            Outcome::Done
        }
        Err(CoreError::NoTransaction) => Outcome::NoTransaction,
        Err(err) => panic!("unexpected transaction error: {err}"),
    }
}
