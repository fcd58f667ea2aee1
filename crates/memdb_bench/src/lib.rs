//! # MemDB Bench
//!
//! Shared data generators for the criterion benchmarks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
