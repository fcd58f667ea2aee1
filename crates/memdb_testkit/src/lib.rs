//! # MemDB Testkit
//!
//! Test utilities for MemDB.
//!
//! This crate provides:
//! - Test fixtures and database helpers
//! - Property-based test generators using proptest
//! - A snapshot-stack reference model to compare the engine against
//! - Stress testing utilities
//! - Protocol test vectors
//!
//! ## Usage
//!
//! ```rust
//! use memdb_testkit::prelude::*;
//!
//! let mut model = Model::new();
//! let mut db = memdb_core::Database::new();
//! let op = Operation::Set { key: "a".into(), value: "1".into() };
//! assert_eq!(apply_to_database(&mut db, &op), model.apply(&op));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod model;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::model::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use model::*;
pub use stress::*;
pub use vectors::*;
