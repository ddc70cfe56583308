//! Per-key callbacks layered on top of the generic observer capability.

use super::observer::EntityObserver;
use crate::key;

///
/// KeyObserverId
///
/// Registration handle returned by [`KeyObserverMap::observe`].
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct KeyObserverId(u64);

///
/// KeyObserverMap
///
/// Dispatches spawnarg events to callbacks registered per key
/// (case-insensitive). Insert and change deliver the new value; erase
/// delivers the empty string so the consumer can fall back to its own
/// default.
///

#[derive(Default)]
pub struct KeyObserverMap {
    entries: Vec<KeyObserverEntry>,
    next_id: u64,
}

struct KeyObserverEntry {
    id: u64,
    kv_key: String,
    callback: Box<dyn FnMut(&str)>,
}

impl KeyObserverMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for `key`. Multiple callbacks per key are
    /// invoked in registration order.
    pub fn observe(&mut self, kv_key: &str, callback: impl FnMut(&str) + 'static) -> KeyObserverId {
        let id = self.next_id;
        self.next_id += 1;

        self.entries.push(KeyObserverEntry {
            id,
            kv_key: kv_key.to_string(),
            callback: Box::new(callback),
        });

        KeyObserverId(id)
    }

    /// Drop a registration. Unknown ids are a no-op.
    pub fn forget(&mut self, id: KeyObserverId) {
        self.entries.retain(|entry| entry.id != id.0);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn dispatch(&mut self, kv_key: &str, value: &str) {
        for entry in &mut self.entries {
            if key::eq_fold(&entry.kv_key, kv_key) {
                (entry.callback)(value);
            }
        }
    }
}

impl EntityObserver for KeyObserverMap {
    fn on_key_insert(&mut self, kv_key: &str, value: &str) {
        self.dispatch(kv_key, value);
    }

    fn on_key_change(&mut self, kv_key: &str, value: &str) {
        self.dispatch(kv_key, value);
    }

    fn on_key_erase(&mut self, kv_key: &str, _value: &str) {
        self.dispatch(kv_key, "");
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::EntityKeyValues,
        test_fixtures::{as_handle, empty_class},
    };
    use std::{cell::RefCell, rc::Rc};

    fn seen_values() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&str) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |value: &str| sink.borrow_mut().push(value.to_string()))
    }

    #[test]
    fn callback_follows_the_key_lifecycle() {
        let (seen, sink) = seen_values();

        let observers = Rc::new(RefCell::new(KeyObserverMap::new()));
        observers.borrow_mut().observe("skin", sink);

        let mut store = EntityKeyValues::new(empty_class());
        store.attach_observer(&as_handle(&observers));

        store.set_key_value("skin", "skins/chair_red");
        store.set_key_value("SKIN", "skins/chair_blue");
        store.set_key_value("skin", "");

        assert_eq!(
            *seen.borrow(),
            vec!["skins/chair_red", "skins/chair_blue", ""],
            "insert and change carry the value, erase carries empty"
        );
    }

    #[test]
    fn unobserved_keys_never_fire() {
        let (seen, sink) = seen_values();

        let observers = Rc::new(RefCell::new(KeyObserverMap::new()));
        observers.borrow_mut().observe("skin", sink);

        let mut store = EntityKeyValues::new(empty_class());
        store.attach_observer(&as_handle(&observers));
        store.set_key_value("model", "models/chair.lwo");

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn forget_stops_dispatch() {
        let (seen, sink) = seen_values();

        let mut observers = KeyObserverMap::new();
        let id = observers.observe("angle", sink);

        observers.on_key_insert("angle", "90");
        observers.forget(id);
        observers.on_key_change("angle", "45");

        assert_eq!(*seen.borrow(), vec!["90"]);
        assert!(observers.is_empty());
    }

    #[test]
    fn forget_of_unknown_id_is_a_no_op() {
        let mut observers = KeyObserverMap::new();
        let id = observers.observe("angle", |_| {});
        observers.forget(id);
        observers.forget(id);
    }
}
