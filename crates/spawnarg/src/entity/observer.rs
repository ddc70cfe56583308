//! Observer capability and the attach-ordered observer set.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

///
/// EntityObserver
///
/// Capability contract for tracking live spawnarg state. Implementors are
/// attached as non-owning handles and must outlive their attachment window
/// or detach first.
///

pub trait EntityObserver {
    fn on_key_insert(&mut self, key: &str, value: &str);
    fn on_key_change(&mut self, key: &str, value: &str);
    fn on_key_erase(&mut self, key: &str, value: &str);
}

/// Shared handle under which observers attach to a store.
pub type ObserverHandle = Rc<RefCell<dyn EntityObserver>>;

///
/// ObserverSet
///
/// Attach-ordered set of weak observer handles keyed by pointer identity.
/// The `notifying` flag is a single-threaded re-entrancy guard, not a lock:
/// mutating the set mid-fan-out is a programming error and fails fast.
/// Reaching that mutation through a store requires an aliased handle to the
/// store itself, which trips the store's `RefCell` borrow first; the flag
/// turns the remaining paths into this named assertion.
///

#[derive(Default)]
pub(crate) struct ObserverSet {
    entries: Vec<Weak<RefCell<dyn EntityObserver>>>,
    notifying: Cell<bool>,
}

impl ObserverSet {
    /// Register `observer`. Attaching an already-present handle keeps the
    /// single entry (fan-out never notifies one observer twice).
    pub(crate) fn attach(&mut self, observer: &ObserverHandle) {
        assert!(
            !self.notifying.get(),
            "observer cannot be attached during notification fan-out"
        );

        if !self.contains(observer) {
            self.entries.push(Rc::downgrade(observer));
        }
    }

    /// Remove `observer`; false when it was never attached.
    pub(crate) fn detach(&mut self, observer: &ObserverHandle) -> bool {
        assert!(
            !self.notifying.get(),
            "observer cannot be detached during notification fan-out"
        );

        let before = self.entries.len();
        self.entries
            .retain(|entry| !std::ptr::addr_eq(entry.as_ptr(), Rc::as_ptr(observer)));
        self.entries.len() != before
    }

    fn contains(&self, observer: &ObserverHandle) -> bool {
        self.entries
            .iter()
            .any(|entry| std::ptr::addr_eq(entry.as_ptr(), Rc::as_ptr(observer)))
    }

    /// Fan an event out to every live observer in attach order. Dead weak
    /// handles are skipped and pruned afterwards.
    pub(crate) fn notify(&mut self, mut event: impl FnMut(&mut dyn EntityObserver)) {
        let guard = NotifyGuard::engage(&self.notifying);
        for entry in &self.entries {
            if let Some(observer) = entry.upgrade() {
                event(&mut *observer.borrow_mut());
            }
        }
        drop(guard);

        self.entries.retain(|entry| entry.strong_count() > 0);
    }

    /// Run a replay against a single observer with the guard engaged, used
    /// for the attach/detach full-state replays.
    pub(crate) fn replay(&self, observer: &ObserverHandle, event: impl FnOnce(&mut dyn EntityObserver)) {
        let _guard = NotifyGuard::engage(&self.notifying);
        event(&mut *observer.borrow_mut());
    }
}

/// Resets the re-entrancy flag on all exits, including unwind.
struct NotifyGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> NotifyGuard<'a> {
    fn engage(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

///
/// TESTS
///
