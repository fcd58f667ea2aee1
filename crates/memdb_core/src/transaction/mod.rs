//! Nested transactions.
//!
//! A transaction is a child [`Layer`](crate::Layer) of the scope it was
//! started from:
//! - **Begin** pushes a new child layer
//! - **Commit** merges a layer into its parent after an optimistic conflict
//!   check, then continues with the parent until the root is reached
//! - **Rollback** discards one layer and hands back its parent

mod lifecycle;
mod state;

pub use state::TransactionState;
