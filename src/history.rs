//! Linear undo/redo over whole-calendar snapshots.
//!
//! Every accepted change pushes the previous calendar onto the undo stack,
//! clears the redo stack and persists the new calendar. Only the current
//! calendar is persisted; the stacks last for the session.

use crate::error::Result;
use crate::model::CalendarData;
use crate::storage::DurableStore;
use std::collections::VecDeque;

pub const DEFAULT_MAX_DEPTH: usize = 50;

pub struct History<S: DurableStore> {
    store: S,
    current: CalendarData,
    undo_stack: VecDeque<CalendarData>,
    redo_stack: Vec<CalendarData>,
    max_depth: usize,
}

impl<S: DurableStore> History<S> {
    /// Starts a session from whatever the store holds.
    pub fn open(store: S, max_depth: usize) -> Self {
        let current = store.load();
        History {
            store,
            current,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn current(&self) -> &CalendarData {
        &self.current
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn mutate(&mut self, next: CalendarData) {
        let previous = std::mem::replace(&mut self.current, next);
        self.undo_stack.push_back(previous);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
        self.persist();
    }

    /// Runs `edit` on a copy of the current calendar and commits the copy
    /// only if the edit succeeds. A failed edit leaves no trace in history.
    pub fn apply<T, F>(&mut self, edit: F) -> Result<T>
    where
        F: FnOnce(&mut CalendarData) -> Result<T>,
    {
        let mut next = self.current.clone();
        let out = edit(&mut next)?;
        self.mutate(next);
        Ok(out)
    }

    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, previous);
        self.redo_stack.push(current);
        self.persist();
        true
    }

    /// Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, next);
        self.undo_stack.push_back(current);
        self.persist();
        true
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.current) {
            tracing::warn!(error = %err, "failed to persist calendar; keeping in-memory state");
        }
    }
}
