//! Bounded undo/redo stacks of validated note snapshots.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Note, NoteId, note_from_state, validate_note};

/// Default number of entries each stack can hold.
pub const DEFAULT_CAPACITY: usize = 100;

/// Errors from reconfiguring the history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history capacity must be at least 1")]
    ZeroCapacity,
}

/// A recorded snapshot and when it was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub snapshot: Note,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    fn new(note: &Note) -> Self {
        Self {
            snapshot: note.snapshot(),
            timestamp: Utc::now(),
        }
    }
}

/// What the presentation layer needs to enable or disable undo/redo controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_len: usize,
    pub redo_len: usize,
}

/// One line of [`HistoryStore::debug_summary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySummary {
    pub timestamp: DateTime<Utc>,
    pub id: NoteId,
    pub title: String,
    pub section_count: usize,
}

impl From<&HistoryEntry> for EntrySummary {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            id: entry.snapshot.id(),
            title: entry.snapshot.title().to_string(),
            section_count: entry.snapshot.sections().len(),
        }
    }
}

/// Inspection view of both stacks, oldest entry first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub undo: Vec<EntrySummary>,
    pub redo: Vec<EntrySummary>,
    pub capacity: usize,
}

type Listener = Box<dyn FnMut(HistoryStatus)>;

/// Undo and redo stacks of note snapshots.
///
/// Every entry is an owned structural copy, so nothing pushed here can be
/// changed through the caller's working copy and nothing returned from
/// [`undo`](Self::undo) or [`redo`](Self::redo) aliases a stored entry.
///
/// The history is linear: recording a new snapshot discards the redo stack.
/// Each stack holds at most `capacity` entries; on overflow the oldest entry
/// is evicted.
pub struct HistoryStore {
    undo: VecDeque<HistoryEntry>,
    redo: VecDeque<HistoryEntry>,
    capacity: usize,
    listeners: Vec<Listener>,
}

impl HistoryStore {
    /// Creates an empty history with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty history holding at most `capacity` entries per stack.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            capacity: capacity.max(1),
            listeners: Vec::new(),
        }
    }

    /// Registers a callback invoked after every push, undo, redo, clear and
    /// capacity change.
    ///
    /// A panicking listener is logged and stays subscribed; the operation
    /// that notified it still completes.
    pub fn subscribe(&mut self, listener: impl FnMut(HistoryStatus) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Records a snapshot of the state preceding an edit.
    ///
    /// Returns true if an entry was added. Invalid snapshots are logged and
    /// ignored; a snapshot equal to the current undo top is dropped so that
    /// repeated commits of the same content collapse into one entry.
    pub fn push(&mut self, state: &Note) -> bool {
        if let Err(e) = validate_note(state) {
            warn!(note_id = state.id(), error = %e, "rejected invalid snapshot");
            return false;
        }

        if self.undo.back().is_some_and(|top| top.snapshot == *state) {
            debug!(note_id = state.id(), "skipped duplicate snapshot");
            return false;
        }

        push_bounded(&mut self.undo, HistoryEntry::new(state), self.capacity);
        self.redo.clear();
        debug!(note_id = state.id(), undo_len = self.undo.len(), "recorded snapshot");
        self.notify();
        true
    }

    /// Validates a raw serialized state and records it like [`push`](Self::push).
    pub fn push_state(&mut self, state: &Value) -> bool {
        match note_from_state(state) {
            Ok(note) => self.push(&note),
            Err(e) => {
                warn!(error = %e, "rejected invalid state");
                false
            }
        }
    }

    /// Steps back one entry.
    ///
    /// `current` is the state being left; when given and valid it is
    /// recorded on the redo stack so [`redo`](Self::redo) can return to it.
    /// Returns `None` if there is nothing to undo or if the popped entry is
    /// corrupt, in which case that entry is discarded.
    pub fn undo(&mut self, current: Option<&Note>) -> Option<Note> {
        let entry = self.undo.pop_back()?;
        let restored = self.accept_popped(entry, "undo");
        if restored.is_some() {
            self.record_counterpart(current, Direction::Redo);
        }
        self.notify();
        restored
    }

    /// Steps forward one entry; the mirror image of [`undo`](Self::undo).
    pub fn redo(&mut self, current: Option<&Note>) -> Option<Note> {
        let entry = self.redo.pop_back()?;
        let restored = self.accept_popped(entry, "redo");
        if restored.is_some() {
            self.record_counterpart(current, Direction::Undo);
        }
        self.notify();
        restored
    }

    /// Empties both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.notify();
    }

    /// Changes the per-stack capacity, evicting the oldest entries if needed.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), HistoryError> {
        if capacity == 0 {
            return Err(HistoryError::ZeroCapacity);
        }
        self.capacity = capacity;
        while self.undo.len() > capacity {
            self.undo.pop_front();
        }
        while self.redo.len() > capacity {
            self.redo.pop_front();
        }
        self.notify();
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Returns the current undo/redo availability.
    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_len: self.undo.len(),
            redo_len: self.redo.len(),
        }
    }

    /// Summarizes both stacks for debugging.
    pub fn debug_summary(&self) -> HistorySummary {
        HistorySummary {
            undo: self.undo.iter().map(EntrySummary::from).collect(),
            redo: self.redo.iter().map(EntrySummary::from).collect(),
            capacity: self.capacity,
        }
    }

    fn accept_popped(&self, entry: HistoryEntry, op: &'static str) -> Option<Note> {
        match validate_note(&entry.snapshot) {
            Ok(()) => Some(entry.snapshot),
            Err(e) => {
                warn!(op, note_id = entry.snapshot.id(), error = %e, "discarded corrupt history entry");
                None
            }
        }
    }

    fn record_counterpart(&mut self, current: Option<&Note>, direction: Direction) {
        let Some(current) = current else {
            return;
        };
        if let Err(e) = validate_note(current) {
            warn!(note_id = current.id(), error = %e, "not recording invalid working state");
            return;
        }
        let stack = match direction {
            Direction::Undo => &mut self.undo,
            Direction::Redo => &mut self.redo,
        };
        push_bounded(stack, HistoryEntry::new(current), self.capacity);
    }

    fn notify(&mut self) {
        let status = self.status();
        for (index, listener) in self.listeners.iter_mut().enumerate() {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(status))).is_err() {
                warn!(listener = index, "history listener panicked");
            }
        }
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStore")
            .field("undo", &self.undo.len())
            .field("redo", &self.redo.len())
            .field("capacity", &self.capacity)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Undo,
    Redo,
}

fn push_bounded(stack: &mut VecDeque<HistoryEntry>, entry: HistoryEntry, capacity: usize) {
    while stack.len() >= capacity {
        stack.pop_front();
    }
    stack.push_back(entry);
}
