use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

pub(crate) type Callback<A> = Rc<dyn Fn(&A)>;

/// Callbacks grouped by key, kept in registration order.
pub(crate) struct Registry<K, A> {
    next_id: u64,
    entries: HashMap<K, BTreeMap<u64, Callback<A>>>,
}

impl<K, A> Registry<K, A>
where
    K: Clone + Eq + Hash + Debug,
{
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            entries: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: K, callback: Callback<A>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.entry(key).or_default().insert(id, callback);
        id
    }

    /// Returns `false` if nothing was registered under `key`/`id`.
    pub(crate) fn remove(&mut self, key: &K, id: u64) -> bool {
        let Some(callbacks) = self.entries.get_mut(key) else {
            return false;
        };
        let removed = callbacks.remove(&id).is_some();
        if callbacks.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    pub(crate) fn len(&self, key: &K) -> usize {
        self.entries.get(key).map_or(0, BTreeMap::len)
    }

    fn snapshot(&self, key: &K) -> Vec<u64> {
        self.entries
            .get(key)
            .map(|callbacks| callbacks.keys().copied().collect())
            .unwrap_or_default()
    }

    fn get(&self, key: &K, id: u64) -> Option<Callback<A>> {
        self.entries.get(key)?.get(&id).cloned()
    }

    /// Invoke every callback registered under `key` with `arg`.
    ///
    /// The id list is captured up front: callbacks registered during the
    /// fan-out miss this round, callbacks removed during it are skipped. No
    /// borrow is held while a callback runs.
    pub(crate) fn fan_out(registry: &RefCell<Self>, key: &K, arg: &A) -> usize {
        Self::fan_out_while(registry, key, arg, || true)
    }

    /// [`Registry::fan_out`], stopping before the next callback once `live`
    /// returns `false`.
    pub(crate) fn fan_out_while<F>(registry: &RefCell<Self>, key: &K, arg: &A, live: F) -> usize
    where
        F: Fn() -> bool,
    {
        let ids = registry.borrow().snapshot(key);
        let mut delivered = 0;
        for id in ids {
            if !live() {
                tracing::trace!(key = ?key, delivered, "fan-out superseded");
                return delivered;
            }
            let callback = registry.borrow().get(key, id);
            if let Some(callback) = callback {
                callback(arg);
                delivered += 1;
            }
        }
        tracing::trace!(key = ?key, delivered, "fan-out");
        delivered
    }
}
