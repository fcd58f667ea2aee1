//! Abstract key-value scope.

use crate::database::Database;
use crate::error::CoreResult;

/// Operations available on the current scope of a database.
///
/// Transaction operations consume nothing and return the scope to continue
/// in. Front ends such as the text protocol are written against this trait
/// so they can run against any implementation.
pub trait Scope: Sized {
    /// Returns the value of `key`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for absent or deleted keys.
    fn get(&self, key: &str) -> CoreResult<String>;

    /// Sets `key` to `value`.
    fn set(&self, key: &str, value: &str);

    /// Deletes `key`.
    fn unset(&self, key: &str);

    /// Returns the number of keys set to `value`.
    fn num_equal_to(&self, value: &str) -> u64;

    /// Opens a nested transaction.
    fn begin(&self) -> Self;

    /// Commits all open transaction blocks.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction`, `TxClosed` or `TxConflict`.
    fn commit(&self) -> CoreResult<Self>;

    /// Rolls back the innermost transaction block.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` or `TxClosed`.
    fn rollback(&self) -> CoreResult<Self>;

    /// Returns the scope to continue in after a failed commit.
    fn recover(&self) -> Self;
}

impl Scope for Database {
    fn get(&self, key: &str) -> CoreResult<String> {
        Database::get(self, key)
    }

    fn set(&self, key: &str, value: &str) {
        Database::set(self, key, value);
    }

    fn unset(&self, key: &str) {
        Database::unset(self, key);
    }

    fn num_equal_to(&self, value: &str) -> u64 {
        Database::num_equal_to(self, value)
    }

    fn begin(&self) -> Self {
        Database::begin(self)
    }

    fn commit(&self) -> CoreResult<Self> {
        Database::commit(self)
    }

    fn rollback(&self) -> CoreResult<Self> {
        Database::rollback(self)
    }

    fn recover(&self) -> Self {
        self.nearest_open()
    }
}
