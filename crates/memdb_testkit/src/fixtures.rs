//! Test fixtures and database helpers.

use memdb_core::{Config, Database};
use memdb_protocol::{ProtocolResult, Socket};
use std::io::Cursor;

/// Runs a test with a fresh database.
///
/// # Example
///
/// ```rust
/// use memdb_testkit::with_temp_db;
///
/// with_temp_db(|db| {
///     db.set("a", "1");
///     assert_eq!(db.num_equal_to("1"), 1);
/// });
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let db = Database::new();
    f(&db)
}

/// Runs a test with a fresh database built from `config`.
pub fn with_config<F, R>(config: Config, f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let db = Database::with_config(config);
    f(&db)
}

/// Creates a database holding `pairs`.
pub fn seeded_database<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Database {
    let db = Database::new();
    for (key, value) in pairs {
        db.set(key, value);
    }
    db
}

/// Opens `depth` nested transactions on top of `db` and returns the
/// innermost one.
pub fn nested(db: &Database, depth: usize) -> Database {
    let mut scope = db.clone();
    for _ in 0..depth {
        scope = scope.begin();
    }
    scope
}

/// Feeds `input` through a protocol socket on a fresh database and returns
/// everything written back.
pub fn run_transcript(input: &str) -> ProtocolResult<String> {
    let mut socket = Socket::new(Database::new());
    let mut out = Vec::new();
    socket.process(Cursor::new(input), &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Common scenarios.
pub mod scenarios {
    use super::*;

    /// Database with `count` keys `k0..` holding values cycling through
    /// `distinct` different values `v0..`.
    pub fn populated_database(count: usize, distinct: usize) -> Database {
        let db = Database::new();
        for i in 0..count {
            db.set(format!("k{i}"), format!("v{}", i % distinct.max(1)));
        }
        db
    }

    /// Two sibling transactions on one root, both having written `key`.
    pub fn competing_siblings(key: &str) -> (Database, Database, Database) {
        let db = seeded_database([(key, "base")]);
        let first = db.begin();
        first.set(key, "first");
        let second = db.begin();
        second.set(key, "second");
        (db, first, second)
    }
}
