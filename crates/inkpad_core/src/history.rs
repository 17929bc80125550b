//! Undo/redo history
//!
//! A strictly linear two-stack log. Each entry is a pair of command objects,
//! one to reverse a mutation and one to replay it. Commands carry only the
//! data they need and are executed through [`Command::apply`], so the log
//! never captures references into the state it edits.

use std::collections::VecDeque;

/// A reversible operation on some target state
pub trait Command<T: ?Sized> {
    /// Result handed back to whoever triggered the undo/redo
    type Output;

    fn apply(&self, target: &mut T) -> Self::Output;
}

#[derive(Clone, Debug)]
struct Entry<C> {
    undo: C,
    redo: C,
}

/// Two-stack undo/redo log
#[derive(Clone, Debug)]
pub struct UndoRedoManager<C> {
    undo_stack: VecDeque<Entry<C>>,
    redo_stack: Vec<Entry<C>>,
    limit: Option<usize>,
}

impl<C> Default for UndoRedoManager<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> UndoRedoManager<C> {
    /// Unbounded history
    pub fn new() -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: None,
        }
    }

    /// History keeping at most `limit` undo entries; the oldest is dropped
    /// first. `None` means unbounded.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::new()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Record a mutation that has just been applied
    ///
    /// Any redo history is discarded.
    pub fn add(&mut self, undo: C, redo: C) {
        self.redo_stack.clear();
        self.undo_stack.push_back(Entry { undo, redo });
        if let Some(limit) = self.limit {
            while self.undo_stack.len() > limit {
                self.undo_stack.pop_front();
            }
        }
        tracing::debug!(
            undo = self.undo_stack.len(),
            "history entry recorded, redo cleared"
        );
    }

    /// Reverse the most recent entry
    pub fn perform_undo<T: ?Sized>(&mut self, target: &mut T) -> Option<C::Output>
    where
        C: Command<T>,
    {
        let entry = self.undo_stack.pop_back()?;
        let output = entry.undo.apply(target);
        self.redo_stack.push(entry);
        tracing::debug!(
            undo = self.undo_stack.len(),
            redo = self.redo_stack.len(),
            "undo"
        );
        Some(output)
    }

    /// Replay the most recently undone entry
    pub fn perform_redo<T: ?Sized>(&mut self, target: &mut T) -> Option<C::Output>
    where
        C: Command<T>,
    {
        let entry = self.redo_stack.pop()?;
        let output = entry.redo.apply(target);
        self.undo_stack.push_back(entry);
        tracing::debug!(
            undo = self.undo_stack.len(),
            redo = self.redo_stack.len(),
            "redo"
        );
        Some(output)
    }

    /// Drop the redo stack only
    pub fn clear_redos(&mut self) {
        self.redo_stack.clear();
    }

    /// Rewrite or drop stored entries in place
    ///
    /// `keep` sees both commands of every entry on both stacks and may edit
    /// them. An entry is dropped when `keep` returns `false` for either of
    /// its commands. Used when the target state is restructured underneath
    /// the log.
    pub fn retain_mut<F>(&mut self, mut keep: F)
    where
        F: FnMut(&mut C) -> bool,
    {
        let mut keep_entry = |entry: &mut Entry<C>| {
            let undo = keep(&mut entry.undo);
            let redo = keep(&mut entry.redo);
            undo && redo
        };
        self.undo_stack.retain_mut(&mut keep_entry);
        self.redo_stack.retain_mut(&mut keep_entry);
        tracing::debug!(
            undo = self.undo_stack.len(),
            redo = self.redo_stack.len(),
            "history entries remapped"
        );
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}
