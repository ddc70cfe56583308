//! Per-entity collection of target keys, kept in sync with the spawnarg
//! store through the observer interface.

use super::{is_target_key, NodeId, TargetHandle, TargetManager};
use crate::entity::EntityObserver;
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

///
/// TargetKey
///
/// One `target*` spawnarg and the shared endpoint it currently points at.
///

pub struct TargetKey {
    name: String,
    target: TargetHandle,
}

impl TargetKey {
    fn bind(name: &str, manager: &mut TargetManager) -> Self {
        Self {
            name: name.to_string(),
            target: manager.target(name),
        }
    }

    fn rebind(&mut self, name: &str, manager: &mut TargetManager) {
        self.name = name.to_string();
        self.target = manager.target(name);
    }

    /// Refresh the endpoint handle from the manager, dropping any stale one
    /// from before a manager reset.
    fn re_resolve(&mut self, manager: &mut TargetManager) {
        self.target = manager.target(&self.name);
    }

    /// The targeted entity name, i.e. the spawnarg's value.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn target(&self) -> &TargetHandle {
        &self.target
    }
}

///
/// TargetKeyCollection
///
/// Tracks every `target*` key of one entity, keyed by spawnarg key. Attach it
/// to a store as an observer; the initial replay populates it and subsequent
/// notifications keep it current. Non-target keys are ignored entirely.
///

pub struct TargetKeyCollection {
    manager: Rc<RefCell<TargetManager>>,
    keys: BTreeMap<String, TargetKey>,
}

impl TargetKeyCollection {
    #[must_use]
    pub fn new(manager: Rc<RefCell<TargetManager>>) -> Self {
        Self {
            manager,
            keys: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Visit the resolved node behind each target key; unresolved endpoints
    /// are skipped.
    pub fn for_each_target(&self, mut f: impl FnMut(NodeId)) {
        for target_key in self.keys.values() {
            if let Some(node) = target_key.target().borrow().node() {
                f(node);
            }
        }
    }

    /// Re-acquire every endpoint handle, e.g. after the scene's manager was
    /// reset on map reload.
    pub fn on_target_manager_changed(&mut self) {
        let mut manager = self.manager.borrow_mut();
        for target_key in self.keys.values_mut() {
            target_key.re_resolve(&mut manager);
        }
    }
}

impl EntityObserver for TargetKeyCollection {
    fn on_key_insert(&mut self, key: &str, value: &str) {
        if !is_target_key(key) {
            return;
        }

        let target_key = TargetKey::bind(value, &mut self.manager.borrow_mut());
        self.keys.insert(key.to_string(), target_key);
    }

    fn on_key_change(&mut self, key: &str, value: &str) {
        if !is_target_key(key) {
            return;
        }

        self.keys
            .get_mut(key)
            .expect("target key changed without an association")
            .rebind(value, &mut self.manager.borrow_mut());
    }

    fn on_key_erase(&mut self, key: &str, _value: &str) {
        if !is_target_key(key) {
            return;
        }

        assert!(
            self.keys.remove(key).is_some(),
            "target key '{key}' erased without an association"
        );
    }
}

///
/// TESTS
///
