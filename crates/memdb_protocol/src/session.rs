//! Session state and reply formatting.

use crate::command::Command;
use memdb_core::{CoreError, Scope};
use tracing::{debug, warn};

/// Reply for a read of an absent key.
pub const NULL: &str = "NULL";

/// Reply for commit or rollback outside a transaction.
pub const NO_TRANSACTION: &str = "NO TRANSACTION";

/// Tracks the current scope of one client and turns results into replies.
#[derive(Debug)]
pub struct Session<S: Scope> {
    scope: S,
}

impl<S: Scope> Session<S> {
    /// Creates a session starting in `scope`.
    pub fn new(scope: S) -> Self {
        Self { scope }
    }

    /// Returns the current scope.
    pub fn scope(&self) -> &S {
        &self.scope
    }

    /// Consumes the session and returns the current scope.
    pub fn into_scope(self) -> S {
        self.scope
    }

    /// Returns the value of `key`, or `NULL` if it is not set.
    pub fn get(&self, key: &str) -> String {
        match self.scope.get(key) {
            Ok(value) => value,
            Err(CoreError::NotFound { .. }) => NULL.to_owned(),
            Err(err) => err.to_string(),
        }
    }

    /// Sets `key` to `value`.
    pub fn set(&self, key: &str, value: &str) {
        self.scope.set(key, value);
    }

    /// Deletes `key`.
    pub fn unset(&self, key: &str) {
        self.scope.unset(key);
    }

    /// Returns the number of keys set to `value`.
    pub fn num_equal_to(&self, value: &str) -> u64 {
        self.scope.num_equal_to(value)
    }

    /// Enters a new transaction.
    pub fn begin(&mut self) -> String {
        self.scope = self.scope.begin();
        String::new()
    }

    /// Commits every open transaction.
    ///
    /// On a conflict the session moves to the innermost scope that is still
    /// open and replies with the error text.
    pub fn commit(&mut self) -> String {
        match self.scope.commit() {
            Ok(scope) => {
                self.scope = scope;
                String::new()
            }
            Err(err) => self.fail(err),
        }
    }

    /// Rolls back the innermost transaction.
    pub fn rollback(&mut self) -> String {
        match self.scope.rollback() {
            Ok(scope) => {
                self.scope = scope;
                String::new()
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: CoreError) -> String {
        if err.is_no_transaction() {
            return NO_TRANSACTION.to_owned();
        }
        warn!(error = %err, "transaction failed");
        self.scope = self.scope.recover();
        err.to_string()
    }

    /// Runs one command and returns its reply line.
    ///
    /// Returns `None` for [`Command::End`].
    pub fn execute(&mut self, command: &Command) -> Option<String> {
        debug!(command = command.keyword(), "execute");
        let reply = match command {
            Command::Set { name, value } => {
                self.set(name, value);
                String::new()
            }
            Command::Get { name } => self.get(name),
            Command::Unset { name } => {
                self.unset(name);
                String::new()
            }
            Command::NumEqualTo { value } => self.num_equal_to(value).to_string(),
            Command::Begin => self.begin(),
            Command::Rollback => self.rollback(),
            Command::Commit => self.commit(),
            Command::End => return None,
        };
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memdb_core::{CoreResult, LayerId};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Scope that logs every call and answers from a script.
    #[derive(Debug, Clone)]
    struct MockScope {
        label: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        get: Option<CoreResult<String>>,
        commit: Option<Result<(), CoreError>>,
        rollback: Option<Result<(), CoreError>>,
    }

    impl MockScope {
        fn new() -> Self {
            Self {
                label: "start",
                log: Rc::default(),
                get: None,
                commit: None,
                rollback: None,
            }
        }

        fn relabel(&self, label: &'static str) -> Self {
            Self {
                label,
                ..self.clone()
            }
        }

        fn record(&self, call: String) {
            self.log.borrow_mut().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.log.borrow().clone()
        }
    }

    impl Scope for MockScope {
        fn get(&self, key: &str) -> CoreResult<String> {
            self.record(format!("get {key}"));
            self.get.clone().unwrap()
        }

        fn set(&self, key: &str, value: &str) {
            self.record(format!("set {key} {value}"));
        }

        fn unset(&self, key: &str) {
            self.record(format!("unset {key}"));
        }

        fn num_equal_to(&self, value: &str) -> u64 {
            self.record(format!("count {value}"));
            1337
        }

        fn begin(&self) -> Self {
            self.record("begin".into());
            self.relabel("child")
        }

        fn commit(&self) -> CoreResult<Self> {
            self.record("commit".into());
            self.commit.clone().unwrap().map(|()| self.relabel("committed"))
        }

        fn rollback(&self) -> CoreResult<Self> {
            self.record("rollback".into());
            self.rollback.clone().unwrap().map(|()| self.relabel("parent"))
        }

        fn recover(&self) -> Self {
            self.record("recover".into());
            self.relabel("recovered")
        }
    }

    #[test]
    fn get_passes_key_and_value() {
        let scope = MockScope {
            get: Some(Ok("someVal".into())),
            ..MockScope::new()
        };
        let session = Session::new(scope.clone());

        assert_eq!(session.get("some-key"), "someVal");
        assert_eq!(scope.calls(), ["get some-key"]);
    }

    #[test]
    fn get_of_missing_key_is_null() {
        let scope = MockScope {
            get: Some(Err(CoreError::not_found("k"))),
            ..MockScope::new()
        };
        assert_eq!(Session::new(scope).get("k"), NULL);
    }

    #[test]
    fn writes_are_forwarded() {
        let scope = MockScope::new();
        let session = Session::new(scope.clone());

        session.set("someKey", "someVal");
        session.unset("some-key-sent");
        assert_eq!(session.num_equal_to("sent-key"), 1337);
        assert_eq!(
            scope.calls(),
            ["set someKey someVal", "unset some-key-sent", "count sent-key"]
        );
    }

    #[test]
    fn begin_switches_scope() {
        let mut session = Session::new(MockScope::new());
        assert_eq!(session.begin(), "");
        assert_eq!(session.scope().label, "child");
    }

    #[test]
    fn commit_switches_scope() {
        let scope = MockScope {
            commit: Some(Ok(())),
            ..MockScope::new()
        };
        let mut session = Session::new(scope);
        assert_eq!(session.commit(), "");
        assert_eq!(session.scope().label, "committed");
    }

    #[test]
    fn commit_without_transaction() {
        let scope = MockScope {
            commit: Some(Err(CoreError::NoTransaction)),
            ..MockScope::new()
        };
        let mut session = Session::new(scope.clone());
        assert_eq!(session.commit(), NO_TRANSACTION);
        assert_eq!(session.scope().label, "start");
        assert_eq!(scope.calls(), ["commit"]);
    }

    #[test]
    fn commit_conflict_recovers() {
        let err = CoreError::conflict("k", LayerId::new(3));
        let scope = MockScope {
            commit: Some(Err(err.clone())),
            ..MockScope::new()
        };
        let mut session = Session::new(scope.clone());

        assert_eq!(session.commit(), err.to_string());
        assert_eq!(session.scope().label, "recovered");
        assert_eq!(scope.calls(), ["commit", "recover"]);
    }

    #[test]
    fn rollback_switches_scope() {
        let scope = MockScope {
            rollback: Some(Ok(())),
            ..MockScope::new()
        };
        let mut session = Session::new(scope);
        assert_eq!(session.rollback(), "");
        assert_eq!(session.scope().label, "parent");
    }

    #[test]
    fn rollback_without_transaction() {
        let scope = MockScope {
            rollback: Some(Err(CoreError::NoTransaction)),
            ..MockScope::new()
        };
        let mut session = Session::new(scope);
        assert_eq!(session.rollback(), NO_TRANSACTION);
        assert_eq!(session.scope().label, "start");
    }

    #[test]
    fn execute_dispatches() {
        let scope = MockScope::new();
        let mut session = Session::new(scope.clone());

        let reply = session.execute(&Command::NumEqualTo { value: "x".into() });
        assert_eq!(reply.as_deref(), Some("1337"));
        let reply = session.execute(&Command::Set {
            name: "a".into(),
            value: "b".into(),
        });
        assert_eq!(reply.as_deref(), Some(""));
        assert_eq!(session.execute(&Command::End), None);
        assert_eq!(scope.calls(), ["count x", "set a b"]);
    }
}
