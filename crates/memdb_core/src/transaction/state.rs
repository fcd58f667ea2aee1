//! Transaction state.

/// State of a layer's transaction.
///
/// The root layer is permanently `Active`. Any other layer moves to
/// `Committed` or `RolledBack` exactly once; a layer in either of those
/// states is *closed*.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is open and can be committed or rolled back.
    Active,
    /// Transaction was merged into its parent.
    Committed,
    /// Transaction was discarded.
    RolledBack,
}

impl TransactionState {
    /// Checks if the transaction is still open.
    #[must_use]
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    /// Checks if the transaction was finalized.
    #[must_use]
    pub fn is_closed(self) -> bool {
        !self.is_active()
    }
}
