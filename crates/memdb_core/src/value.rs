//! Versioned key states.

use crate::types::LayerId;
use std::sync::Arc;

/// One point-in-time value of a key, as seen from the layer that wrote it.
///
/// States are immutable once created. Modifying a key always allocates a
/// new state whose `prev` link points at the state that was visible to the
/// writing layer just before the write. The link is only used to detect
/// commit conflicts; reads never follow it.
#[derive(Debug)]
pub struct ValueState {
    /// Stored scalar. Empty for tombstones.
    data: String,
    /// State visible before this one.
    prev: Option<Arc<ValueState>>,
    /// True if the key was unset at this version.
    deleted: bool,
    /// Layer that created this state.
    origin: LayerId,
}

impl ValueState {
    /// Creates a live state holding `data`.
    pub(crate) fn live(data: String, prev: Option<Arc<ValueState>>, origin: LayerId) -> Self {
        Self {
            data,
            prev,
            deleted: false,
            origin,
        }
    }

    /// Creates a tombstone.
    pub(crate) fn tombstone(prev: Option<Arc<ValueState>>, origin: LayerId) -> Self {
        Self {
            data: String::new(),
            prev,
            deleted: true,
            origin,
        }
    }

    /// Returns the stored value, or `None` for a tombstone.
    #[must_use]
    pub fn data(&self) -> Option<&str> {
        if self.deleted {
            None
        } else {
            Some(&self.data)
        }
    }

    /// Returns the state that was visible before this one.
    #[must_use]
    pub fn prev(&self) -> Option<&Arc<ValueState>> {
        self.prev.as_ref()
    }

    /// Returns true if this state marks the key as deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns the layer that created this state.
    #[must_use]
    pub fn origin(&self) -> LayerId {
        self.origin
    }

    /// Number of links reachable through `prev`.
    #[must_use]
    pub fn history_len(&self) -> usize {
        let mut len = 0;
        let mut cursor = self.prev.as_deref();
        while let Some(state) = cursor {
            len += 1;
            cursor = state.prev.as_deref();
        }
        len
    }
}

// Unlinks the history iteratively so long chains cannot overflow the stack.
impl Drop for ValueState {
    fn drop(&mut self) {
        let mut next = self.prev.take();
        while let Some(state) = next {
            match Arc::try_unwrap(state) {
                Ok(mut inner) => next = inner.prev.take(),
                Err(_) => break,
            }
        }
    }
}
