//! Database configuration.

/// Configuration for creating a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Whether a write may rebind its history link past an earlier write
    /// made in the same layer.
    ///
    /// Keeps in-layer history chains at most two links long. Links that
    /// cross a transaction boundary are never compacted.
    pub compact_history: bool,

    /// Whether to maintain the operation counters in [`DatabaseStats`].
    ///
    /// [`DatabaseStats`]: crate::DatabaseStats
    pub collect_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compact_history: true,
            collect_stats: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to compact in-layer history links.
    #[must_use]
    pub const fn compact_history(mut self, value: bool) -> Self {
        self.compact_history = value;
        self
    }

    /// Sets whether to collect operation statistics.
    #[must_use]
    pub const fn collect_stats(mut self, value: bool) -> Self {
        self.collect_stats = value;
        self
    }
}
