//! Targeting: named link endpoints shared across entities, and the per-entity
//! collection that derives its links from `target*` spawnargs.

mod key_collection;

pub use key_collection::{TargetKey, TargetKeyCollection};

use crate::key;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
};

///
/// NodeId
///
/// Opaque identity of a scene node holding a targetable entity.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[display("#{_0}")]
pub struct NodeId(pub u64);

///
/// Target
///
/// One named link endpoint. Starts unresolved; resolution happens when the
/// entity carrying the matching `name` spawnarg enters the scene.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Target {
    #[default]
    Unresolved,
    Resolved(NodeId),
}

impl Target {
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        match self {
            Self::Resolved(node) => Some(*node),
            Self::Unresolved => None,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Shared endpoint handle. Every collection pointing a key at the same target
/// name holds the same cell, so resolution propagates without notification.
pub type TargetHandle = Rc<RefCell<Target>>;

/// True for `target`, `target1`, `TARGET2`, ... and any other key naming a
/// link (case-insensitive prefix match).
#[must_use]
pub fn is_target_key(kv_key: &str) -> bool {
    key::starts_with_fold(kv_key, "target")
}

///
/// TargetManager
///
/// Scene-wide registry of target name to endpoint handle. Lookup creates the
/// endpoint on demand so links can exist before their targets do.
///

#[derive(Default)]
pub struct TargetManager {
    targets: HashMap<String, TargetHandle>,
}

impl TargetManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoint handle for `name`, created unresolved on first request.
    #[must_use]
    pub fn target(&mut self, name: &str) -> TargetHandle {
        Rc::clone(
            self.targets
                .entry(name.to_string())
                .or_default(),
        )
    }

    /// Resolve `name` to `node`. Every handle already pointing at this name
    /// observes the resolution.
    pub fn associate(&mut self, name: &str, node: NodeId) {
        *self.target(name).borrow_mut() = Target::Resolved(node);
    }

    /// Back to unresolved, e.g. when the named entity leaves the scene.
    pub fn clear_association(&mut self, name: &str) {
        *self.target(name).borrow_mut() = Target::Unresolved;
    }

    /// Unresolve and drop every endpoint. Handles held by collections go
    /// stale until the collections re-resolve against this manager.
    pub fn reset(&mut self) {
        for handle in self.targets.values() {
            *handle.borrow_mut() = Target::Unresolved;
        }
        self.targets.clear();
    }
}

///
/// TESTS
///
