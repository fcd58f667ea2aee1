//! # MemDB Core
//!
//! In-memory key-value database with nested transactions.
//!
//! This crate provides:
//! - String keys mapped to string values
//! - Value counts answered without scanning
//! - Arbitrarily deep nested transactions with optimistic commit checks
//! - Rollback of the innermost transaction block
//!
//! ## Design Principles
//!
//! - Every scope is a [`Layer`] linked to its parent; a transaction stores
//!   only the keys it wrote
//! - Value history is an immutable `Arc`-linked chain of [`ValueState`]s
//! - Commit compares the parent's current state of every written key with
//!   the state the transaction captured, by identity
//! - Sibling transactions never see each other's writes
//!
//! ## Example
//!
//! ```rust
//! use memdb_core::{CoreError, Database};
//!
//! let db = Database::new();
//! let tx = db.begin();
//! tx.set("a", "30");
//! let tx = tx.begin();
//! tx.set("a", "40");
//!
//! let db = tx.commit().unwrap();
//! assert_eq!(db.get("a").unwrap(), "40");
//! assert_eq!(db.rollback().unwrap_err(), CoreError::NoTransaction);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod layer;
mod scope;
mod stats;
mod transaction;
mod types;
mod value;

pub use config::Config;
pub use database::Database;
pub use error::{CoreError, CoreResult};
pub use layer::Layer;
pub use scope::Scope;
pub use stats::{DatabaseStats, StatsSnapshot};
pub use transaction::TransactionState;
pub use types::LayerId;
pub use value::ValueState;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
