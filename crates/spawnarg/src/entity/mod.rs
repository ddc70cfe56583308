//! The per-entity spawnarg store and its observer plumbing.

mod key_observers;
mod key_value;
mod observer;

pub use key_observers::{KeyObserverId, KeyObserverMap};
pub use key_value::KeyValue;
pub use observer::{EntityObserver, ObserverHandle};

use crate::{
    eclass::EntityClass,
    key,
    undo::{ChangeTracker, Snapshot, UndoTarget},
};
use observer::ObserverSet;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

///
/// EntityKeyValues
///
/// Insertion-ordered sequence of (stored-case key, value) pairs with a
/// case-insensitive lookup index, observer fan-out, class-default
/// inheritance, and undo integration. Owned exclusively by one entity node.
///
/// Undo granularity is asymmetric on purpose: in-place overwrites snapshot
/// per value, key creation and removal snapshot the whole store.
///

pub struct EntityKeyValues {
    eclass: Rc<dyn EntityClass>,
    pairs: Vec<(String, Rc<RefCell<KeyValue>>)>,
    index: HashMap<String, usize>,
    observers: ObserverSet,
    tracker: Option<Rc<RefCell<dyn ChangeTracker>>>,
    is_container: bool,
}

impl EntityKeyValues {
    #[must_use]
    pub fn new(eclass: Rc<dyn EntityClass>) -> Self {
        let is_container = !eclass.is_fixed_size();

        Self {
            eclass,
            pairs: Vec::new(),
            index: HashMap::new(),
            observers: ObserverSet::default(),
            tracker: None,
            is_container,
        }
    }

    #[must_use]
    pub fn eclass(&self) -> &Rc<dyn EntityClass> {
        &self.eclass
    }

    // ── lookups ───────────────────────────────────────

    /// Current value for `key`, falling back to the class default (empty
    /// when the class declares none). Absence is not an error.
    #[must_use]
    pub fn key_value(&self, kv_key: &str) -> String {
        self.find(kv_key).map_or_else(
            || self.eclass.default_value(kv_key).to_string(),
            |pos| self.pairs[pos].1.borrow().get().to_string(),
        )
    }

    /// True iff `key` has no local override and the class default for it is
    /// non-empty. Inheriting an empty value counts as no value.
    #[must_use]
    pub fn is_inherited(&self, kv_key: &str) -> bool {
        self.find(kv_key).is_none() && !self.eclass.default_value(kv_key).is_empty()
    }

    /// Shared handle of the stored value slot, if the key is set locally.
    #[must_use]
    pub fn key_value_handle(&self, kv_key: &str) -> Option<Rc<RefCell<KeyValue>>> {
        self.find(kv_key).map(|pos| Rc::clone(&self.pairs[pos].1))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Visit every pair in insertion order.
    pub fn for_each(&self, mut f: impl FnMut(&str, &str)) {
        for (kv_key, slot) in &self.pairs {
            f(kv_key, slot.borrow().get());
        }
    }

    /// All pairs whose key starts with `prefix` (case-insensitive), in
    /// insertion order.
    #[must_use]
    pub fn pairs_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .filter(|(kv_key, _)| key::starts_with_fold(kv_key, prefix))
            .map(|(kv_key, slot)| (kv_key.clone(), slot.borrow().get().to_string()))
            .collect()
    }

    /// Ordered capture of the current key set.
    #[must_use]
    pub fn export_state(&self) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .map(|(kv_key, slot)| (kv_key.clone(), slot.borrow().get().to_string()))
            .collect()
    }

    // ── convenience queries ───────────────────────────

    #[must_use]
    pub fn is_worldspawn(&self) -> bool {
        self.key_value("classname") == "worldspawn"
    }

    /// A func_static with a name of its own is a model reference.
    #[must_use]
    pub fn is_model(&self) -> bool {
        let name = self.key_value("name");
        let model = self.key_value("model");

        self.key_value("classname") == "func_static" && !name.is_empty() && name != model
    }

    #[must_use]
    pub fn is_of_type(&self, class_name: &str) -> bool {
        self.eclass.is_of_type(class_name)
    }

    #[must_use]
    pub const fn is_container(&self) -> bool {
        self.is_container
    }

    pub const fn set_is_container(&mut self, is_container: bool) {
        self.is_container = is_container;
    }

    // ── mutation ──────────────────────────────────────

    /// Set `key` to `value`. An empty value erases the key: deleting is the
    /// documented way to unset a property.
    pub fn set_key_value(&mut self, kv_key: &str, value: &str) {
        if value.is_empty() {
            self.erase(kv_key);
        } else {
            self.insert(kv_key, value);
        }
    }

    /// Remove `key`. No-op when absent; otherwise records a store-level
    /// checkpoint and fires an erase notification with the removed value.
    pub fn erase(&mut self, kv_key: &str) {
        let Some(pos) = self.find(kv_key) else {
            return;
        };

        self.checkpoint();
        self.erase_at(pos);
    }

    // ── observers ─────────────────────────────────────

    /// Attach and synchronously replay an insert for every current key, so a
    /// late-attaching observer reaches full knowledge without polling.
    ///
    /// Fatal when called during a notification fan-out.
    pub fn attach_observer(&mut self, observer: &ObserverHandle) {
        self.observers.attach(observer);

        let state = self.export_state();
        self.observers.replay(observer, |obs| {
            for (kv_key, value) in &state {
                obs.on_key_insert(kv_key, value);
            }
        });
    }

    /// Detach, replaying an erase for every current key so the observer can
    /// tear down per-key derived state. Unknown observers are a silent
    /// no-op with no notification side effects.
    ///
    /// Fatal when called during a notification fan-out.
    pub fn detach_observer(&mut self, observer: &ObserverHandle) {
        if !self.observers.detach(observer) {
            return;
        }

        let state = self.export_state();
        self.observers.replay(observer, |obs| {
            for (kv_key, value) in &state {
                obs.on_key_erase(kv_key, value);
            }
        });
    }

    // ── undo ──────────────────────────────────────────

    /// Connect the change tracker; every mutation from here on records undo
    /// snapshots. Connecting while already connected is a programming error:
    /// disconnect first.
    pub fn connect_undo_system(&mut self, tracker: Rc<RefCell<dyn ChangeTracker>>) {
        assert!(
            self.tracker.is_none(),
            "undo system already connected; disconnect first"
        );
        self.tracker = Some(tracker);
    }

    pub fn disconnect_undo_system(&mut self) {
        self.tracker = None;
    }

    /// True while connected to a change tracker, i.e. the owning entity is
    /// live in an editable scene.
    #[must_use]
    pub fn is_instanced(&self) -> bool {
        self.tracker.is_some()
    }

    /// Replace the whole key set from an ordered capture. Observers see the
    /// individual erase and insert events, never a single bulk event, and no
    /// checkpoints are recorded. Case-duplicate keys in the input collapse
    /// to one pair, later value winning, exactly as repeated `set_key_value`
    /// calls would.
    pub fn import_state(&mut self, pairs: &[(String, String)]) {
        while !self.pairs.is_empty() {
            self.erase_at(0);
        }

        for (kv_key, value) in pairs {
            if let Some(pos) = self.find(kv_key) {
                self.overwrite_at(pos, value);
            } else {
                self.insert_new(kv_key, value);
            }
        }
    }

    // ── internals ─────────────────────────────────────

    fn find(&self, kv_key: &str) -> Option<usize> {
        self.index.get(&key::fold(kv_key)).copied()
    }

    fn insert(&mut self, kv_key: &str, value: &str) {
        if let Some(pos) = self.find(kv_key) {
            // Overwrite in place, preserving the stored case of the key.
            // Undo granularity here is per value; no store-level checkpoint.
            let stored_key = self.pairs[pos].0.clone();
            let previous = self.pairs[pos].1.borrow_mut().assign(value);

            if let Some(tracker) = &self.tracker {
                tracker.borrow_mut().record(Snapshot::Value {
                    key: stored_key.clone(),
                    value: previous,
                });
            }

            self.observers
                .notify(|obs| obs.on_key_change(&stored_key, value));
        } else {
            self.checkpoint();
            self.insert_new(kv_key, value);
        }
    }

    /// Overwrite in place without recording a snapshot, for restore paths.
    /// Fires the change notification with the stored-case key.
    fn overwrite_at(&mut self, pos: usize, value: &str) {
        let stored_key = self.pairs[pos].0.clone();
        self.pairs[pos].1.borrow_mut().assign(value);

        self.observers
            .notify(|obs| obs.on_key_change(&stored_key, value));
    }

    fn insert_new(&mut self, kv_key: &str, value: &str) {
        let slot = Rc::new(RefCell::new(KeyValue::new(
            value,
            self.eclass.default_value(kv_key),
        )));

        self.index.insert(key::fold(kv_key), self.pairs.len());
        self.pairs.push((kv_key.to_string(), slot));

        self.observers.notify(|obs| obs.on_key_insert(kv_key, value));
    }

    fn erase_at(&mut self, pos: usize) {
        let (kv_key, slot) = self.pairs.remove(pos);
        self.rebuild_index();

        let value = slot.borrow().get().to_string();
        self.observers.notify(|obs| obs.on_key_erase(&kv_key, &value));
    }

    /// Store-level checkpoint of the pre-change state, recorded before any
    /// structural mutation.
    fn checkpoint(&mut self) {
        if let Some(tracker) = &self.tracker {
            tracker.borrow_mut().record(Snapshot::Pairs {
                pairs: self.export_state(),
            });
        }
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (pos, (kv_key, _)) in self.pairs.iter().enumerate() {
            self.index.insert(key::fold(kv_key), pos);
        }
    }
}

impl Clone for EntityKeyValues {
    /// Deep-copies keys and values only. Observers and any undo connection
    /// never carry over to the copy.
    fn clone(&self) -> Self {
        let mut store = Self::new(Rc::clone(&self.eclass));
        store.is_container = self.is_container;

        for (kv_key, slot) in &self.pairs {
            store.insert_new(kv_key, slot.borrow().get());
        }

        store
    }
}

impl UndoTarget for EntityKeyValues {
    fn capture_counterpart(&self, snapshot: &Snapshot) -> Snapshot {
        match snapshot {
            Snapshot::Value { key: kv_key, .. } => Snapshot::Value {
                key: kv_key.clone(),
                value: self.key_value(kv_key),
            },
            Snapshot::Pairs { .. } => Snapshot::Pairs {
                pairs: self.export_state(),
            },
        }
    }

    fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        match snapshot {
            Snapshot::Pairs { pairs } => self.import_state(pairs),
            Snapshot::Value { key: kv_key, value } => {
                if let Some(pos) = self.find(kv_key) {
                    self.overwrite_at(pos, value);
                }
            }
        }
    }
}

///
/// TESTS
///
