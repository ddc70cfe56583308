//! Entity key-value ("spawnarg") model for idTech-style map editors: an
//! order-preserving property store with observer fan-out, class-default
//! inheritance, undo snapshotting, and a derived index over `target*` keys.
//!
//! Single-threaded by design. Mutation and notification run synchronously on
//! the calling thread; shared handles use `Rc`/`RefCell`.
#![warn(unreachable_pub)]

pub mod eclass;
pub mod entity;
pub mod target;
pub mod undo;

pub(crate) mod key;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No concrete undo system, managers, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        eclass::EntityClass,
        entity::{EntityKeyValues, EntityObserver},
        target::NodeId,
    };
}
