//! CLI command implementations.

pub mod error;
pub mod serve;
pub mod stats;
