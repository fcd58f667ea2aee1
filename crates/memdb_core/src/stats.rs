//! Database statistics.
//!
//! Counters are shared by every layer of one database, so a transaction's
//! activity shows up in the same place as work done directly on the root.
//!
//! # Usage
//!
//! ```rust
//! use memdb_core::Database;
//!
//! let db = Database::new();
//! db.set("a", "10");
//! let _ = db.get("a");
//!
//! let stats = db.stats().snapshot();
//! assert_eq!(stats.writes, 1);
//! assert_eq!(stats.reads, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Database statistics and metrics.
///
/// All counters are atomic and monotonically increasing.
#[derive(Debug, Default)]
pub struct DatabaseStats {
    /// Total number of `get` calls.
    reads: AtomicU64,
    /// Total number of `set` calls.
    writes: AtomicU64,
    /// Total number of `unset` calls.
    deletes: AtomicU64,
    /// Total number of `num_equal_to` calls.
    count_queries: AtomicU64,

    /// Total number of transactions started.
    transactions_started: AtomicU64,
    /// Total number of successful `commit` calls.
    transactions_committed: AtomicU64,
    /// Total number of layers merged into their parent.
    layers_merged: AtomicU64,
    /// Total number of transactions rolled back.
    transactions_rolled_back: AtomicU64,
    /// Total number of commits refused because of a conflict.
    conflicts: AtomicU64,
}

impl DatabaseStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_count_query(&self) {
        self.count_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction_start(&self) {
        self.transactions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction_commit(&self) {
        self.transactions_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_layer_merge(&self) {
        self.layers_merged.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction_rollback(&self) {
        self.transactions_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_conflict(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total number of read operations.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the total number of write operations.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Returns the total number of delete operations.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Returns the total number of value count queries.
    pub fn count_queries(&self) -> u64 {
        self.count_queries.load(Ordering::Relaxed)
    }

    /// Returns the total number of transactions started.
    pub fn transactions_started(&self) -> u64 {
        self.transactions_started.load(Ordering::Relaxed)
    }

    /// Returns the total number of successful `commit` calls.
    pub fn transactions_committed(&self) -> u64 {
        self.transactions_committed.load(Ordering::Relaxed)
    }

    /// Returns the total number of layers merged into their parent.
    ///
    /// A single `commit` of a nested transaction merges every layer up to
    /// the root, so it can add more than one.
    pub fn layers_merged(&self) -> u64 {
        self.layers_merged.load(Ordering::Relaxed)
    }

    /// Returns the total number of transactions rolled back.
    pub fn transactions_rolled_back(&self) -> u64 {
        self.transactions_rolled_back.load(Ordering::Relaxed)
    }

    /// Returns the total number of refused commits.
    pub fn conflicts(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all stats.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            reads: self.reads(),
            writes: self.writes(),
            deletes: self.deletes(),
            count_queries: self.count_queries(),
            transactions_started: self.transactions_started(),
            transactions_committed: self.transactions_committed(),
            layers_merged: self.layers_merged(),
            transactions_rolled_back: self.transactions_rolled_back(),
            conflicts: self.conflicts(),
        }
    }
}

/// A point-in-time snapshot of database statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Total number of read operations.
    pub reads: u64,
    /// Total number of write operations.
    pub writes: u64,
    /// Total number of delete operations.
    pub deletes: u64,
    /// Total number of value count queries.
    pub count_queries: u64,
    /// Total number of transactions started.
    pub transactions_started: u64,
    /// Total number of successful commits.
    pub transactions_committed: u64,
    /// Total number of layers merged into their parent.
    pub layers_merged: u64,
    /// Total number of transactions rolled back.
    pub transactions_rolled_back: u64,
    /// Total number of refused commits.
    pub conflicts: u64,
}
