//! Core type definitions for MemDB.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a layer (the root database or one transaction).
///
/// Layer IDs are unique within one database and never reused. The root
/// always has ID 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

impl LayerId {
    /// The root layer.
    pub const ROOT: Self = Self(0);

    /// Creates a new layer ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns true for the root layer.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer:{}", self.0)
    }
}

/// Monotonic allocator for layer IDs.
#[derive(Debug)]
pub(crate) struct LayerIdAllocator {
    next: AtomicU64,
}

impl LayerIdAllocator {
    pub(crate) fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub(crate) fn allocate(&self) -> LayerId {
        LayerId::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
