//! Stress tests for MemDB.
//!
//! These helpers drive many transaction chains against one database from
//! several threads.

use memdb_core::Database;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {name} ===");
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform, split across threads.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Number of distinct keys.
    pub key_count: usize,
    /// Transactions opened per committed chain.
    pub nesting: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            key_count: 64,
            nesting: 2,
        }
    }
}

fn key_for(thread: usize, i: usize, key_count: usize) -> String {
    format!("key{}", (thread * 31 + i * 7) % key_count.max(1))
}

/// Writes and commits nested chains sequentially.
///
/// Every commit is expected to succeed.
pub fn stress_sequential_commits(db: &Database, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let mut scope = db.begin();
        for _ in 1..config.nesting {
            scope = scope.begin();
        }
        scope.set(key_for(0, i, config.key_count), i.to_string());

        match scope.commit() {
            Ok(_) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Commits sibling chains from several threads.
///
/// Failed operations are commits refused by a conflict.
pub fn stress_concurrent_commits(db: &Database, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let ops_per_thread = config.operations / config.threads.max(1);

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let db = db.clone();
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let config = config.clone();

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let mut scope = db.begin();
                    for _ in 1..config.nesting {
                        scope = scope.begin();
                    }
                    let key = key_for(t, i, config.key_count);
                    scope.set(key.as_str(), format!("t{t}-{i}"));

                    match scope.commit() {
                        Ok(_) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Reads from several threads while the database is not written.
pub fn stress_concurrent_reads(db: &Database, config: &StressConfig) -> StressTestResult {
    for i in 0..config.key_count {
        db.set(format!("key{i}"), "value");
    }

    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let ops_per_thread = config.operations / config.threads.max(1);

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let db = db.clone();
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let key_count = config.key_count;

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    match db.get(&key_for(t, i, key_count)) {
                        Ok(_) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}
