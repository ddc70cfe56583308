//! Undo integration: snapshots, the change-tracker capability, and a
//! concrete undo/redo system with named operations.

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Snapshot
///
/// One recorded capture. `Value` restores a single overwritten value;
/// `Pairs` restores the whole ordered key set. The split mirrors the store's
/// checkpoint granularity: in-place overwrites snapshot per value,
/// structural changes snapshot per store.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Snapshot {
    Value { key: String, value: String },
    Pairs { pairs: Vec<(String, String)> },
}

///
/// ChangeTracker
///
/// "Record a checkpoint now." The store invokes this before structural
/// mutation (with a `Pairs` capture of the pre-change state) and on in-place
/// overwrites (with the `Value` being replaced).
///

pub trait ChangeTracker {
    fn record(&mut self, snapshot: Snapshot);
}

///
/// UndoTarget
///
/// Restore surface of a store. `capture_counterpart` produces the snapshot
/// that reverses `snapshot` against the target's current state; applying a
/// snapshot must never record new checkpoints.
///

pub trait UndoTarget {
    fn capture_counterpart(&self, snapshot: &Snapshot) -> Snapshot;
    fn apply_snapshot(&mut self, snapshot: &Snapshot);
}

///
/// UndoError
///
/// Empty-stack undo and redo are the only recoverable failures in this
/// crate; everything else in the taxonomy is absence or a fatal
/// programming-invariant violation.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum UndoError {
    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}

///
/// Operation
///
/// A named group of snapshots recorded between begin/finish. Restored in
/// reverse record order so the earliest capture wins.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Operation {
    name: String,
    snapshots: Vec<Snapshot>,
}

impl Operation {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }
}

///
/// UndoSystem
///
/// Concrete change tracker with undo/redo stacks. The tracker holds no
/// reference to any store; `undo`/`redo` take the target explicitly and
/// exchange the popped operation for its counterpart captured from the
/// target's current state.
///

#[derive(Default)]
pub struct UndoSystem {
    undo_stack: Vec<Operation>,
    redo_stack: Vec<Operation>,
    open: Option<Operation>,
}

impl UndoSystem {
    /// Fallback name for snapshots recorded outside begin/finish.
    const UNNAMED: &'static str = "unnamed";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a named operation; snapshots recorded until `finish_operation`
    /// group into one undo step. An operation left open is finished first.
    pub fn begin_operation(&mut self, name: impl Into<String>) {
        self.finish_operation();
        self.open = Some(Operation {
            name: name.into(),
            snapshots: Vec::new(),
        });
    }

    /// Close the open operation and push it onto the undo stack. Operations
    /// with no recorded snapshots are dropped.
    pub fn finish_operation(&mut self) {
        if let Some(op) = self.open.take() {
            if !op.snapshots.is_empty() {
                self.undo_stack.push(op);
            }
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
            || self.open.as_ref().is_some_and(|op| !op.snapshots.is_empty())
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Name of the operation the next `undo` would revert.
    #[must_use]
    pub fn next_undo_name(&self) -> Option<&str> {
        self.open
            .as_ref()
            .filter(|op| !op.snapshots.is_empty())
            .or_else(|| self.undo_stack.last())
            .map(Operation::name)
    }

    /// Revert the most recent operation against `target`, pushing its redo
    /// counterpart. An open operation is finished first.
    pub fn undo(&mut self, target: &mut dyn UndoTarget) -> Result<(), UndoError> {
        self.finish_operation();

        let op = self.undo_stack.pop().ok_or(UndoError::NothingToUndo)?;
        let counterpart = Self::exchange(&op, target);
        self.redo_stack.push(counterpart);

        Ok(())
    }

    /// Re-apply the most recently undone operation against `target`.
    pub fn redo(&mut self, target: &mut dyn UndoTarget) -> Result<(), UndoError> {
        self.finish_operation();

        let op = self.redo_stack.pop().ok_or(UndoError::NothingToRedo)?;
        let counterpart = Self::exchange(&op, target);
        self.undo_stack.push(counterpart);

        Ok(())
    }

    /// Apply `op` in reverse record order, capturing each counterpart
    /// immediately before its snapshot is applied. The counterpart list is
    /// kept in capture order, so exchanging it back replays the original
    /// captures last-to-first.
    fn exchange(op: &Operation, target: &mut dyn UndoTarget) -> Operation {
        let mut counterparts = Vec::with_capacity(op.snapshots.len());

        for snapshot in op.snapshots.iter().rev() {
            counterparts.push(target.capture_counterpart(snapshot));
            target.apply_snapshot(snapshot);
        }

        Operation {
            name: op.name.clone(),
            snapshots: counterparts,
        }
    }
}

impl ChangeTracker for UndoSystem {
    /// Recording invalidates the redo stack. With no operation open, an
    /// implicit unnamed one is opened.
    fn record(&mut self, snapshot: Snapshot) {
        self.redo_stack.clear();
        self.open
            .get_or_insert_with(|| Operation {
                name: Self::UNNAMED.to_string(),
                snapshots: Vec::new(),
            })
            .snapshots
            .push(snapshot);
    }
}

///
/// TESTS
///
