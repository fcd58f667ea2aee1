//! Property-based test generators using proptest.
//!
//! Keys and values are drawn from small alphabets so that random sequences
//! overwrite, delete and count the same entries often.

use memdb_protocol::Command;
use proptest::prelude::*;

/// Strategy for keys from a small alphabet.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_owned)
}

/// Strategy for values from a small alphabet.
pub fn value_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["0", "1", "2", "10", "x y"]).prop_map(str::to_owned)
}

/// One database operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Set a key.
    Set {
        /// Key
        key: String,
        /// Value
        value: String,
    },
    /// Delete a key.
    Unset {
        /// Key
        key: String,
    },
    /// Read a key.
    Get {
        /// Key
        key: String,
    },
    /// Count keys holding a value.
    NumEqualTo {
        /// Value
        value: String,
    },
    /// Open a nested transaction.
    Begin,
    /// Commit all open transactions.
    Commit,
    /// Roll back the innermost transaction.
    Rollback,
}

impl Operation {
    /// Returns the equivalent protocol command.
    pub fn to_command(&self) -> Command {
        match self.clone() {
            Operation::Set { key, value } => Command::Set { name: key, value },
            Operation::Unset { key } => Command::Unset { name: key },
            Operation::Get { key } => Command::Get { name: key },
            Operation::NumEqualTo { value } => Command::NumEqualTo { value },
            Operation::Begin => Command::Begin,
            Operation::Commit => Command::Commit,
            Operation::Rollback => Command::Rollback,
        }
    }
}

/// Strategy for a single operation.
pub fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| Operation::Set { key, value }),
        2 => key_strategy().prop_map(|key| Operation::Unset { key }),
        3 => key_strategy().prop_map(|key| Operation::Get { key }),
        2 => value_strategy().prop_map(|value| Operation::NumEqualTo { value }),
        2 => Just(Operation::Begin),
        1 => Just(Operation::Commit),
        1 => Just(Operation::Rollback),
    ]
}

/// Strategy for a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
