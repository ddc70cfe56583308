//! Shared fixtures for unit tests.

use crate::{
    eclass::{ClassDef, EntityClass},
    entity::{EntityObserver, ObserverHandle},
};
use std::{cell::RefCell, rc::Rc};

/// Class with no defaults and no fixed size.
pub(crate) fn empty_class() -> Rc<dyn EntityClass> {
    Rc::new(ClassDef::new("func_static"))
}

/// Fixed-size class declaring a couple of attribute defaults.
pub(crate) fn monster_class() -> Rc<dyn EntityClass> {
    Rc::new(
        ClassDef::new("monster_zombie")
            .fixed_size(true)
            .attribute("health", "50")
            .attribute("team", "alpha"),
    )
}

///
/// RecordingObserver
///
/// Appends one line per notification so tests can assert on exact event
/// order and payloads.
///

#[derive(Default)]
pub(crate) struct RecordingObserver {
    pub(crate) events: Vec<String>,
}

impl EntityObserver for RecordingObserver {
    fn on_key_insert(&mut self, key: &str, value: &str) {
        self.events.push(format!("insert {key}={value}"));
    }

    fn on_key_change(&mut self, key: &str, value: &str) {
        self.events.push(format!("change {key}={value}"));
    }

    fn on_key_erase(&mut self, key: &str, value: &str) {
        self.events.push(format!("erase {key}={value}"));
    }
}

pub(crate) fn recording_observer() -> Rc<RefCell<RecordingObserver>> {
    Rc::new(RefCell::new(RecordingObserver::default()))
}

/// Unsize a concrete observer into the handle type the store expects. The
/// clone's type is pinned so the coercion happens on the return, not inside
/// `clone`'s inference.
pub(crate) fn as_handle<T: EntityObserver + 'static>(observer: &Rc<RefCell<T>>) -> ObserverHandle {
    Rc::<RefCell<T>>::clone(observer)
}
