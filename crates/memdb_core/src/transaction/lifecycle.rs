//! Begin, commit and rollback of layers.

use crate::error::{CoreError, CoreResult};
use crate::layer::Layer;
use crate::transaction::TransactionState;
use crate::value::ValueState;
use std::sync::Arc;
use tracing::{debug, warn};

impl Layer {
    /// Starts a nested transaction on top of this layer.
    #[must_use]
    pub fn tx(self: &Arc<Self>) -> Arc<Layer> {
        let child = Arc::new(Layer::child_of(self));
        self.shared.record(|s| s.record_transaction_start());
        debug!(layer = %child.id, parent = %self.id, depth = child.depth, "begin");
        child
    }

    /// Commits this layer and every ancestor up to the root.
    ///
    /// Returns the root on success. Committing the root itself fails with
    /// [`CoreError::NoTransaction`].
    ///
    /// # Errors
    ///
    /// - [`CoreError::NoTransaction`] if this layer is the root
    /// - [`CoreError::TxClosed`] if this layer was already committed or
    ///   rolled back, or if the layer it would merge into was; nothing is
    ///   merged and this layer stays open in the latter case
    /// - [`CoreError::TxConflict`] if some layer's parent changed a key after
    ///   that layer captured it; the refused layer and its ancestors stay
    ///   open and untouched, layers merged before it stay merged
    pub fn commit(self: &Arc<Self>) -> CoreResult<Arc<Layer>> {
        self.commit_from(false)
    }

    /// Commit entry point that knows whether it was reached by propagation
    /// from a child's successful merge.
    ///
    /// Reaching the root that way succeeds; calling it on the root directly
    /// is a user error.
    pub(crate) fn commit_from(self: &Arc<Self>, from_recursion: bool) -> CoreResult<Arc<Layer>> {
        let mut layer = Arc::clone(self);
        let mut from_recursion = from_recursion;
        loop {
            match layer.merge_into_parent(from_recursion)? {
                Some(parent) => {
                    layer = parent;
                    from_recursion = true;
                }
                None => break,
            }
        }

        if layer.id != self.id {
            self.shared.record(|s| s.record_transaction_commit());
            debug!(layer = %self.id, "commit");
        }
        Ok(layer)
    }

    /// Merges this layer into its parent.
    ///
    /// Returns the parent to continue with, or `None` once the root was
    /// reached through propagation. The parent's merge lock is held only for
    /// the conflict check and the replay.
    fn merge_into_parent(&self, from_recursion: bool) -> CoreResult<Option<Arc<Layer>>> {
        let Some(parent) = &self.parent else {
            if from_recursion {
                return Ok(None);
            }
            debug!(layer = %self.id, "commit without transaction");
            return Err(CoreError::NoTransaction);
        };

        let mut state = self.state.lock();
        if state.is_closed() {
            let closed = *state;
            warn!(layer = %self.id, state = ?closed, "commit of closed transaction");
            return Err(CoreError::closed(self.id));
        }
        // Children merging into this layer finish before its writes are read.
        let _own = self.merge_lock.lock();

        // Held through the replay so the parent cannot close underneath it.
        let parent_state = parent.state.lock();
        if parent_state.is_closed() {
            let closed = *parent_state;
            warn!(
                layer = %self.id,
                parent = %parent.id,
                state = ?closed,
                "commit into closed transaction"
            );
            return Err(CoreError::closed(parent.id));
        }
        let _merge = parent.merge_lock.lock();

        let mut writes: Vec<(String, Arc<ValueState>)> = self
            .data
            .read()
            .local
            .iter()
            .map(|(key, written)| (key.clone(), Arc::clone(written)))
            .collect();
        writes.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        for (key, latest) in &writes {
            if self.conflicts_with(parent, key, latest) {
                self.shared.record(|s| s.record_conflict());
                warn!(layer = %self.id, parent = %parent.id, key = %key, "commit conflict");
                return Err(CoreError::conflict(key.clone(), self.id));
            }
        }

        for (key, latest) in writes {
            match latest.data() {
                Some(value) => parent.set(key, value),
                None => parent.unset(key),
            }
        }

        *state = TransactionState::Committed;
        self.shared.record(|s| s.record_layer_merge());
        debug!(layer = %self.id, parent = %parent.id, "merge");

        Ok(Some(Arc::clone(parent)))
    }

    /// Checks whether `parent` changed `key` after this layer captured it.
    ///
    /// The captured state is the first link of the key's history that does
    /// not belong to this layer. A key the parent still cannot see was never
    /// touched there and is not a conflict.
    fn conflicts_with(&self, parent: &Layer, key: &str, latest: &ValueState) -> bool {
        let Some(current) = parent.get(key) else {
            return false;
        };
        match self.captured_base(latest) {
            Some(base) => !Arc::ptr_eq(&current, &base),
            None => true,
        }
    }

    /// Walks past this layer's own history links to the inherited state.
    fn captured_base(&self, latest: &ValueState) -> Option<Arc<ValueState>> {
        let mut link = latest.prev().cloned();
        while let Some(state) = link.as_ref().filter(|state| state.origin() == self.id) {
            link = state.prev().cloned();
        }
        link
    }

    /// Discards this layer and returns its parent.
    ///
    /// Only the most recent transaction block is undone.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NoTransaction`] if this layer is the root
    /// - [`CoreError::TxClosed`] if this layer was already committed or
    ///   rolled back
    pub fn rollback(self: &Arc<Self>) -> CoreResult<Arc<Layer>> {
        let Some(parent) = &self.parent else {
            debug!(layer = %self.id, "rollback without transaction");
            return Err(CoreError::NoTransaction);
        };

        let mut state = self.state.lock();
        if state.is_closed() {
            let closed = *state;
            warn!(layer = %self.id, state = ?closed, "rollback of closed transaction");
            return Err(CoreError::closed(self.id));
        }
        let _own = self.merge_lock.lock();
        *state = TransactionState::RolledBack;

        let mut data = self.data.write();
        data.local.clear();
        data.value_counts.clear();

        self.shared.record(|s| s.record_transaction_rollback());
        debug!(layer = %self.id, parent = %parent.id, "rollback");

        Ok(Arc::clone(parent))
    }

    /// Returns the innermost layer of this chain that is still open.
    ///
    /// After a conflict reported from an ancestor level, the caller's own
    /// layer may already be merged; this finds the scope to continue in.
    #[must_use]
    pub fn nearest_open(self: &Arc<Self>) -> Arc<Layer> {
        let mut layer = self;
        while layer.state().is_closed() {
            match &layer.parent {
                Some(parent) => layer = parent,
                None => break,
            }
        }
        Arc::clone(layer)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::error::CoreError;
    use crate::layer::Layer;
    use crate::transaction::TransactionState;
    use std::sync::Arc;

    /// Root with five distinct keys `k0..k4` holding `v0..v4`.
    fn seeded_root() -> Arc<Layer> {
        let root = Layer::root(Config::default());
        for i in 0..5 {
            root.set(format!("k{i}"), format!("v{i}"));
        }
        root
    }

    fn data_of(layer: &Layer, key: &str) -> Option<String> {
        layer
            .get(key)
            .and_then(|state| state.data().map(str::to_owned))
    }

    #[test]
    fn child_sees_parent_counts() {
        let root = seeded_root();
        let tx = root.tx();
        for i in 0..5 {
            assert_eq!(tx.num_equal_to(&format!("v{i}")), 1);
        }
    }

    #[test]
    fn child_change_is_isolated() {
        let root = seeded_root();
        let tx = root.tx();
        tx.set("k4", "new");

        assert_eq!(data_of(&tx, "k4").as_deref(), Some("new"));
        assert_eq!(data_of(&root, "k4").as_deref(), Some("v4"));
        assert_eq!(tx.num_equal_to("new"), 1);
        assert_eq!(root.num_equal_to("new"), 0);
        assert_eq!(tx.num_equal_to("v4"), 0);
        assert_eq!(root.num_equal_to("v4"), 1);
    }

    #[test]
    fn commit_applies_changes_and_returns_root() {
        let root = seeded_root();
        let tx = root.tx();
        tx.set("k4", "new");
        tx.unset("k0");

        let got = tx.commit().unwrap();
        assert!(Arc::ptr_eq(&got, &root));
        assert_eq!(data_of(&root, "k4").as_deref(), Some("new"));
        assert!(root.get("k0").unwrap().is_deleted());
        assert_eq!(root.num_equal_to("new"), 1);
        assert_eq!(root.num_equal_to("v4"), 0);
        assert_eq!(root.num_equal_to("v0"), 0);
        assert_eq!(tx.state(), TransactionState::Committed);
    }

    #[test]
    fn rollback_forgets_changes_and_returns_parent() {
        let root = seeded_root();
        let tx = root.tx();
        tx.set("k4", "new");

        let got = tx.rollback().unwrap();
        assert!(Arc::ptr_eq(&got, &root));
        assert_eq!(data_of(&root, "k4").as_deref(), Some("v4"));
        assert_eq!(root.num_equal_to("new"), 0);
        assert_eq!(tx.state(), TransactionState::RolledBack);
    }

    #[test]
    fn conflicting_parent_change_fails_commit() {
        let root = seeded_root();
        let tx = root.tx();
        tx.set("k4", "new");

        root.set("k4", "changed");

        let err = tx.commit().unwrap_err();
        assert_eq!(err, CoreError::conflict("k4", tx.id()));
        assert_eq!(data_of(&root, "k4").as_deref(), Some("changed"));
        assert_eq!(root.num_equal_to("new"), 0);
        assert!(tx.state().is_active());
    }

    #[test]
    fn conflict_on_key_created_in_parent_meanwhile() {
        let root = Layer::root(Config::default());
        let tx = root.tx();
        tx.set("fresh", "1");
        tx.set("fresh", "2");

        root.set("fresh", "0");

        assert!(tx.commit().unwrap_err().is_conflict());
    }

    #[test]
    fn parent_delete_is_a_conflict() {
        let root = seeded_root();
        let tx = root.tx();
        tx.set("k1", "new");

        root.unset("k1");

        assert!(tx.commit().unwrap_err().is_conflict());
    }

    #[test]
    fn unrelated_parent_change_does_not_conflict() {
        let root = seeded_root();
        let tx = root.tx();
        tx.set("k4", "new");

        root.set("other", "x");

        assert!(tx.commit().is_ok());
        assert_eq!(data_of(&root, "k4").as_deref(), Some("new"));
        assert_eq!(data_of(&root, "other").as_deref(), Some("x"));
    }

    #[test]
    fn repeated_writes_in_child_do_not_conflict() {
        let root = seeded_root();
        let tx = root.tx();
        for i in 0..4 {
            tx.set("k2", format!("step{i}"));
        }
        tx.unset("k2");
        tx.set("k2", "final");

        tx.commit().unwrap();
        assert_eq!(data_of(&root, "k2").as_deref(), Some("final"));
        assert_eq!(root.num_equal_to("v2"), 0);
        assert_eq!(root.num_equal_to("final"), 1);
    }

    #[test]
    fn repeated_writes_without_compaction_do_not_conflict() {
        let root = Layer::root(Config::new().compact_history(false));
        root.set("k", "0");
        let tx = root.tx();
        for i in 1..6 {
            tx.set("k", i.to_string());
        }

        tx.commit().unwrap();
        assert_eq!(data_of(&root, "k").as_deref(), Some("5"));
    }

    #[test]
    fn conflict_leaves_child_retryable_after_rollback_of_parent_change() {
        let root = seeded_root();
        let tx = root.tx();
        tx.set("k3", "mine");

        let sibling = root.tx();
        sibling.set("k3", "theirs");
        sibling.commit().unwrap();

        assert!(tx.commit().unwrap_err().is_conflict());
        assert!(tx.state().is_active());
        assert_eq!(data_of(&tx, "k3").as_deref(), Some("mine"));
        assert!(tx.rollback().is_ok());
    }

    #[test]
    fn nested_rollback_returns_direct_parent() {
        let root = seeded_root();
        let tx = root.tx();
        let tx2 = tx.tx();

        let got = tx2.rollback().unwrap();
        assert!(Arc::ptr_eq(&got, &tx));
        assert!(tx.state().is_active());
    }

    #[test]
    fn nested_commit_returns_root() {
        let root = seeded_root();
        let tx = root.tx();
        let tx2 = tx.tx();

        let got = tx2.commit().unwrap();
        assert!(Arc::ptr_eq(&got, &root));
        assert!(tx.state().is_closed());
        assert!(tx2.state().is_closed());
    }

    #[test]
    fn deep_commit_applies_writes_in_order() {
        let root = Layer::root(Config::default());
        root.set("a", "0");
        let l1 = root.tx();
        l1.set("a", "1");
        l1.set("b", "1");
        let l2 = l1.tx();
        l2.set("a", "2");
        l2.unset("b");
        let l3 = l2.tx();
        l3.set("c", "3");
        l3.set("a", "3");

        l3.commit().unwrap();

        assert_eq!(data_of(&root, "a").as_deref(), Some("3"));
        assert!(root.get("b").unwrap().is_deleted());
        assert_eq!(data_of(&root, "c").as_deref(), Some("3"));
        assert_eq!(root.num_equal_to("3"), 2);
        assert_eq!(root.num_equal_to("1"), 0);
        assert_eq!(root.num_equal_to("0"), 0);
    }

    #[test]
    fn root_commit_is_no_transaction() {
        let root = seeded_root();
        assert_eq!(root.commit().unwrap_err(), CoreError::NoTransaction);
        assert_eq!(root.rollback().unwrap_err(), CoreError::NoTransaction);
    }

    #[test]
    fn root_reached_by_propagation_succeeds() {
        let root = seeded_root();
        let got = root.commit_from(true).unwrap();
        assert!(Arc::ptr_eq(&got, &root));
    }

    #[test]
    fn closed_layer_always_fails() {
        let root = seeded_root();
        let tx = root.tx();
        tx.set("k0", "x");
        tx.commit().unwrap();

        for _ in 0..3 {
            assert_eq!(tx.commit().unwrap_err(), CoreError::closed(tx.id()));
            assert_eq!(tx.rollback().unwrap_err(), CoreError::closed(tx.id()));
        }
        assert_eq!(data_of(&root, "k0").as_deref(), Some("x"));
        assert_eq!(root.num_equal_to("x"), 1);
    }

    #[test]
    fn commit_into_committed_parent_keeps_child_open() {
        let root = seeded_root();
        let parent = root.tx();
        let child = parent.tx();
        child.set("k0", "child");
        parent.commit().unwrap();

        let err = child.commit().unwrap_err();
        assert_eq!(err, CoreError::closed(parent.id()));
        assert!(child.state().is_active());
        assert_eq!(data_of(&child, "k0").as_deref(), Some("child"));
        assert_eq!(data_of(&root, "k0").as_deref(), Some("v0"));
        assert_eq!(root.num_equal_to("child"), 0);
        assert!(Arc::ptr_eq(&child.nearest_open(), &child));
        assert!(child.rollback().is_ok());
    }

    #[test]
    fn commit_into_rolled_back_parent_keeps_child_open() {
        let root = seeded_root();
        let parent = root.tx();
        let child = parent.tx();
        child.set("new", "child");
        parent.rollback().unwrap();

        let err = child.commit().unwrap_err();
        assert_eq!(err, CoreError::closed(parent.id()));
        assert!(child.state().is_active());
        assert_eq!(data_of(&child, "new").as_deref(), Some("child"));
        assert!(root.get("new").is_none());
        assert_eq!(root.stats().snapshot().layers_merged, 0);
    }

    #[test]
    fn rolled_back_layer_cannot_commit() {
        let root = seeded_root();
        let tx = root.tx();
        tx.set("k0", "x");
        tx.rollback().unwrap();

        assert_eq!(tx.commit().unwrap_err(), CoreError::closed(tx.id()));
        assert_eq!(data_of(&root, "k0").as_deref(), Some("v0"));
    }

    #[test]
    fn conflict_at_ancestor_keeps_ancestor_open() {
        let root = seeded_root();
        let l1 = root.tx();
        l1.set("k1", "l1");
        let l2 = l1.tx();
        l2.set("k2", "l2");

        root.set("k1", "root");

        let err = l2.commit().unwrap_err();
        assert_eq!(err, CoreError::conflict("k1", l1.id()));
        assert!(l2.state().is_closed());
        assert!(l1.state().is_active());
        assert_eq!(data_of(&l1, "k2").as_deref(), Some("l2"));
        assert_eq!(data_of(&root, "k2").as_deref(), Some("v2"));

        let scope = l2.nearest_open();
        assert!(Arc::ptr_eq(&scope, &l1));
    }

    #[test]
    fn nearest_open_of_open_layer_is_itself() {
        let root = seeded_root();
        let tx = root.tx();
        assert!(Arc::ptr_eq(&tx.nearest_open(), &tx));
        assert!(Arc::ptr_eq(&root.nearest_open(), &root));
    }

    #[test]
    fn transaction_stats_are_recorded() {
        let root = seeded_root();
        let tx = root.tx();
        let tx2 = tx.tx();
        tx2.commit().unwrap();
        let tx3 = root.tx();
        tx3.rollback().unwrap();

        let stats = root.stats().snapshot();
        assert_eq!(stats.transactions_started, 3);
        assert_eq!(stats.transactions_committed, 1);
        assert_eq!(stats.layers_merged, 2);
        assert_eq!(stats.transactions_rolled_back, 1);
    }
}
