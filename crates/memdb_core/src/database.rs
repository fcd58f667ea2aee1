//! Database facade.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::layer::Layer;
use crate::stats::DatabaseStats;
use crate::types::LayerId;
use std::fmt;
use std::sync::Arc;

/// Handle to one scope of an in-memory database.
///
/// A `Database` is cheap to clone and always points at a single layer: the
/// root, or a nested transaction. Transaction operations return the handle
/// for the scope to continue in; the caller keeps track of it.
///
/// ```rust
/// use memdb_core::Database;
///
/// let db = Database::new();
/// db.set("a", "10");
///
/// let tx = db.begin();
/// tx.set("a", "20");
/// assert_eq!(tx.get("a").unwrap(), "20");
///
/// let db = tx.rollback().unwrap();
/// assert_eq!(db.get("a").unwrap(), "10");
/// ```
#[derive(Clone)]
pub struct Database {
    layer: Arc<Layer>,
}

impl Database {
    /// Creates an empty database with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty database with a custom configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            layer: Layer::root(config),
        }
    }

    fn scoped(layer: Arc<Layer>) -> Self {
        Self { layer }
    }

    /// Returns the value of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the key was never set or is
    /// deleted in this scope.
    pub fn get(&self, key: &str) -> CoreResult<String> {
        self.layer.shared.record(|s| s.record_read());
        self.layer
            .get(key)
            .and_then(|state| state.data().map(str::to_owned))
            .ok_or_else(|| CoreError::not_found(key))
    }

    /// Sets `key` to `value` in this scope.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.layer.shared.record(|s| s.record_write());
        self.layer.set(key, value);
    }

    /// Deletes `key` in this scope. Unknown keys are accepted.
    pub fn unset(&self, key: impl Into<String>) {
        self.layer.shared.record(|s| s.record_delete());
        self.layer.unset(key);
    }

    /// Returns the number of keys currently set to `value`.
    #[must_use]
    pub fn num_equal_to(&self, value: &str) -> u64 {
        self.layer.shared.record(|s| s.record_count_query());
        self.layer.num_equal_to(value)
    }

    /// Opens a nested transaction and returns its handle.
    #[must_use]
    pub fn begin(&self) -> Self {
        Self::scoped(self.layer.tx())
    }

    /// Commits every open transaction block of this chain.
    ///
    /// Returns the root handle on success.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NoTransaction`] on the root
    /// - [`CoreError::TxClosed`] if this scope was already finalized
    /// - [`CoreError::TxConflict`] if a merge was refused; use
    ///   [`nearest_open`](Self::nearest_open) to continue
    pub fn commit(&self) -> CoreResult<Self> {
        self.layer.commit().map(Self::scoped)
    }

    /// Discards the innermost transaction block and returns its parent.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NoTransaction`] on the root
    /// - [`CoreError::TxClosed`] if this scope was already finalized
    pub fn rollback(&self) -> CoreResult<Self> {
        self.layer.rollback().map(Self::scoped)
    }

    /// Returns the innermost scope of this chain that is still open.
    #[must_use]
    pub fn nearest_open(&self) -> Self {
        Self::scoped(self.layer.nearest_open())
    }

    /// Returns the ID of this scope's layer.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.layer.id()
    }

    /// Returns the transaction nesting depth. The root has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layer.depth()
    }

    /// Checks whether this handle points at the root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.layer.parent().is_none()
    }

    /// Checks whether this scope can still be written and committed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.layer.state().is_active()
    }

    /// Returns the statistics shared by every scope of this database.
    #[must_use]
    pub fn stats(&self) -> &DatabaseStats {
        self.layer.stats()
    }

    /// Returns the database configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        self.layer.config()
    }

    /// Returns the underlying layer.
    #[must_use]
    pub fn layer(&self) -> &Arc<Layer> {
        &self.layer
    }

    /// Checks whether both handles point at the same scope.
    #[must_use]
    pub fn same_scope(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.layer, &other.layer)
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("id", &self.id())
            .field("depth", &self.depth())
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}
