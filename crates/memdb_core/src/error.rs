//! Error types for MemDB core.

use crate::types::LayerId;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in MemDB core operations.
///
/// Every variant is recoverable and reported synchronously to the caller.
/// `NotFound` and `NoTransaction` are steady-state outcomes, `TxConflict`
/// leaves all state untouched, and `TxClosed` signals caller misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Key is absent or deleted in the visible chain.
    #[error("key not found: {key}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },

    /// Commit or rollback was requested with no open transaction.
    #[error("no transaction in progress")]
    NoTransaction,

    /// The parent changed a key after this transaction captured it.
    #[error("transaction conflict on key {key:?} while committing {layer}")]
    TxConflict {
        /// The first conflicting key.
        key: String,
        /// The layer whose merge was refused. It stays open.
        layer: LayerId,
    },

    /// Commit or rollback on a layer that was already finalized.
    #[error("transaction already closed: {layer}")]
    TxClosed {
        /// The closed layer.
        layer: LayerId,
    },
}

impl CoreError {
    /// Creates a not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a transaction conflict error.
    pub fn conflict(key: impl Into<String>, layer: LayerId) -> Self {
        Self::TxConflict {
            key: key.into(),
            layer,
        }
    }

    /// Creates a transaction closed error.
    pub fn closed(layer: LayerId) -> Self {
        Self::TxClosed { layer }
    }

    /// Returns true for errors the protocol reports as `NO TRANSACTION`.
    #[must_use]
    pub fn is_no_transaction(&self) -> bool {
        matches!(self, Self::NoTransaction)
    }

    /// Returns true if the error is an optimistic commit conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::TxConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(CoreError::not_found("a").to_string(), "key not found: a");
        assert_eq!(
            CoreError::NoTransaction.to_string(),
            "no transaction in progress"
        );
        assert_eq!(
            CoreError::conflict("k", LayerId::new(3)).to_string(),
            "transaction conflict on key \"k\" while committing layer:3"
        );
        assert_eq!(
            CoreError::closed(LayerId::new(7)).to_string(),
            "transaction already closed: layer:7"
        );
    }

    #[test]
    fn predicates() {
        assert!(CoreError::NoTransaction.is_no_transaction());
        assert!(!CoreError::NoTransaction.is_conflict());
        assert!(CoreError::conflict("k", LayerId::ROOT).is_conflict());
    }
}
