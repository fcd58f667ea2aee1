//! Layered key-value storage.

use crate::config::Config;
use crate::stats::DatabaseStats;
use crate::transaction::TransactionState;
use crate::types::{LayerId, LayerIdAllocator};
use crate::value::ValueState;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// State shared by every layer of one database.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) config: Config,
    pub(crate) stats: DatabaseStats,
    pub(crate) ids: LayerIdAllocator,
}

impl Shared {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config,
            stats: DatabaseStats::new(),
            ids: LayerIdAllocator::new(),
        }
    }

    /// Runs `f` against the counters if stats collection is enabled.
    pub(crate) fn record(&self, f: impl FnOnce(&DatabaseStats)) {
        if self.config.collect_stats {
            f(&self.stats);
        }
    }
}

/// Keys written in one layer plus that layer's value counts.
#[derive(Debug, Default)]
pub(crate) struct LayerData {
    /// Most recent state of every key written in this layer.
    pub(crate) local: HashMap<String, Arc<ValueState>>,
    /// Number of live keys per value, as seen from this layer.
    ///
    /// Seeded lazily from the parent, then maintained on every write.
    pub(crate) value_counts: HashMap<String, u64>,
}

/// One scope of the database: the root or a nested transaction.
///
/// A layer stores only the keys it modified itself and resolves everything
/// else through its parent chain. Writes never leave the layer they were
/// made in until a commit replays them into the parent.
///
/// Locks are always taken from a child towards its ancestors, never the
/// other way around.
pub struct Layer {
    pub(crate) id: LayerId,
    pub(crate) depth: usize,
    pub(crate) parent: Option<Arc<Layer>>,
    pub(crate) shared: Arc<Shared>,
    pub(crate) data: RwLock<LayerData>,
    pub(crate) state: Mutex<TransactionState>,
    /// Held by a child's commit while it checks and merges into this layer.
    pub(crate) merge_lock: Mutex<()>,
}

impl Layer {
    /// Creates a root layer.
    pub fn root(config: Config) -> Arc<Self> {
        Arc::new(Self {
            id: LayerId::ROOT,
            depth: 0,
            parent: None,
            shared: Arc::new(Shared::new(config)),
            data: RwLock::new(LayerData::default()),
            state: Mutex::new(TransactionState::Active),
            merge_lock: Mutex::new(()),
        })
    }

    /// Creates an empty child of `parent`.
    pub(crate) fn child_of(parent: &Arc<Self>) -> Self {
        Self {
            id: parent.shared.ids.allocate(),
            depth: parent.depth + 1,
            parent: Some(Arc::clone(parent)),
            shared: Arc::clone(&parent.shared),
            data: RwLock::new(LayerData::default()),
            state: Mutex::new(TransactionState::Active),
            merge_lock: Mutex::new(()),
        }
    }

    /// Returns this layer's ID.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Returns the nesting depth. The root has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the enclosing layer, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<Layer>> {
        self.parent.as_ref()
    }

    /// Returns the current transaction state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        *self.state.lock()
    }

    /// Returns the configuration of the owning database.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Returns the statistics of the owning database.
    #[must_use]
    pub fn stats(&self) -> &DatabaseStats {
        &self.shared.stats
    }

    /// Number of keys written in this layer, tombstones included.
    #[must_use]
    pub fn local_len(&self) -> usize {
        self.data.read().local.len()
    }

    /// Returns the state of `key` visible from this layer.
    ///
    /// Deleted keys yield a tombstone; `None` means the key was never
    /// written anywhere in the visible chain.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<ValueState>> {
        self.get_is_local(key).0
    }

    /// Like [`get`](Self::get), also reporting whether the state was
    /// written in this layer rather than inherited.
    #[must_use]
    pub fn get_is_local(&self, key: &str) -> (Option<Arc<ValueState>>, bool) {
        let data = self.data.read();
        self.resolve(&data.local, key)
    }

    /// Looks `key` up in `local`, this layer's already locked map, then in
    /// the ancestors.
    fn resolve(
        &self,
        local: &HashMap<String, Arc<ValueState>>,
        key: &str,
    ) -> (Option<Arc<ValueState>>, bool) {
        if let Some(state) = local.get(key) {
            return (Some(Arc::clone(state)), true);
        }
        let mut next = self.parent.as_deref();
        while let Some(layer) = next {
            if let Some(state) = layer.data.read().local.get(key) {
                return (Some(Arc::clone(state)), false);
            }
            next = layer.parent.as_deref();
        }
        (None, false)
    }

    /// Returns the number of live keys equal to `value`.
    ///
    /// The first query for a value walks up to the nearest layer that has
    /// it cached and memoizes the answer in every layer passed on the way.
    /// The root is authoritative and answers 0 for values it never saw.
    #[must_use]
    pub fn num_equal_to(&self, value: &str) -> u64 {
        let mut missed: Vec<&Layer> = Vec::new();
        let mut layer = self;
        let mut count = loop {
            if let Some(&count) = layer.data.read().value_counts.get(value) {
                break count;
            }
            match &layer.parent {
                Some(parent) => {
                    missed.push(layer);
                    layer = &**parent;
                }
                None => break 0,
            }
        };

        for layer in missed.into_iter().rev() {
            let mut data = layer.data.write();
            count = *data.value_counts.entry(value.to_owned()).or_insert(count);
        }
        count
    }

    /// Sets `key` to `value` in this layer.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.write(key.into(), Some(value.into()));
    }

    /// Deletes `key` in this layer by installing a tombstone.
    ///
    /// Succeeds for keys that were never set.
    pub fn unset(&self, key: impl Into<String>) {
        self.write(key.into(), None);
    }

    fn write(&self, key: String, value: Option<String>) {
        let mut data = self.data.write();

        let (prev, is_local) = self.resolve(&data.local, &key);

        // 3 -> 2 -> 1 becomes 3 -> 1, but only while 2 belongs to this layer.
        let link = match &prev {
            Some(state) if is_local && self.shared.config.compact_history => {
                state.prev().cloned().or_else(|| Some(Arc::clone(state)))
            }
            _ => prev.clone(),
        };

        let state = match value {
            Some(value) => ValueState::live(value, link, self.id),
            None => ValueState::tombstone(link, self.id),
        };

        trace!(
            layer = %self.id,
            key = %key,
            deleted = state.is_deleted(),
            "write"
        );

        self.refresh_counts(&mut data, &state, prev.as_deref());
        data.local.insert(key, Arc::new(state));
    }

    /// Adjusts the value counts for a state replacing `prev`.
    ///
    /// `prev` is the state actually visible before the write, not the
    /// possibly compacted history link.
    fn refresh_counts(&self, data: &mut LayerData, state: &ValueState, prev: Option<&ValueState>) {
        let old = prev.and_then(ValueState::data);
        let new = state.data();

        if let Some(parent) = &self.parent {
            for value in [new, old].into_iter().flatten() {
                if !data.value_counts.contains_key(value) {
                    let inherited = parent.num_equal_to(value);
                    data.value_counts.insert(value.to_owned(), inherited);
                }
            }
        }

        if let Some(old) = old {
            let count = data.value_counts.entry(old.to_owned()).or_insert(0);
            *count = count.saturating_sub(1);
        }
        if let Some(new) = new {
            *data.value_counts.entry(new.to_owned()).or_insert(0) += 1;
        }
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("state", &self.state())
            .field("local_len", &self.local_len())
            .finish_non_exhaustive()
    }
}

// Deep transaction chains are released iteratively.
impl Drop for Layer {
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(layer) = next {
            match Arc::try_unwrap(layer) {
                Ok(mut inner) => next = inner.parent.take(),
                Err(_) => break,
            }
        }
    }
}
