//! The note collection persisted under a single key.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::kv::{KeyValueStore, StoreError};
use crate::domain::{Note, NoteId, note_from_state};

/// Key the whole collection is stored under.
pub const NOTES_KEY: &str = "notes";

/// Errors writing notes to durable storage.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("note not found: {id}")]
    NoteNotFound { id: NoteId },

    #[error("failed to serialize notes: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The persistence operations the editor needs.
pub trait NoteRepository {
    /// All notes, most recently created first.
    fn notes(&self) -> &[Note];

    /// Creates a default note at the front of the collection and saves.
    ///
    /// If the save fails the note is not kept.
    fn create_note(&mut self, now: DateTime<Utc>) -> Result<Note, PersistenceError>;

    /// Replaces the stored note with the same id, stamping `updated_at`, and
    /// saves. The in-memory replacement is kept even if the save fails so the
    /// next successful save carries it.
    fn update_note(&mut self, note: &Note, now: DateTime<Utc>) -> Result<(), PersistenceError>;

    /// Removes a note and saves. Returns false if no such note existed.
    fn delete_note(&mut self, id: NoteId) -> Result<bool, PersistenceError>;

    fn find(&self, id: NoteId) -> Option<&Note> {
        self.notes().iter().find(|n| n.id() == id)
    }

    /// Notes whose title or sections contain `term`, ignoring case.
    fn search(&self, term: &str) -> Vec<&Note> {
        self.notes().iter().filter(|n| n.matches(term)).collect()
    }
}

/// All notes, kept in memory and written back as one JSON array.
#[derive(Debug)]
pub struct NoteCollection<S> {
    store: S,
    notes: Vec<Note>,
    /// The stored value was not loaded in full and must be set aside
    /// before the first save replaces it.
    damaged: bool,
}

impl<S: KeyValueStore> NoteCollection<S> {
    /// Loads the collection from `store`.
    ///
    /// Records that are not valid notes are skipped with a warning; an
    /// unreadable or non-array value yields an empty collection. In either
    /// case the stored value is kept under `notes.corrupt-<time>` when the
    /// collection is next saved, so nothing on disk is lost to the overwrite.
    pub fn load(store: S) -> Self {
        let (notes, damaged) = match store.load(NOTES_KEY) {
            Ok(Some(Value::Array(items))) => {
                let notes: Vec<Note> = items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| match note_from_state(item) {
                        Ok(note) => Some(note),
                        Err(e) => {
                            warn!(index, error = %e, "skipping invalid stored note");
                            None
                        }
                    })
                    .collect();
                let damaged = notes.len() < items.len();
                (notes, damaged)
            }
            Ok(Some(other)) => {
                warn!(kind = json_kind(&other), "stored notes are not an array");
                (Vec::new(), true)
            }
            Ok(None) => (Vec::new(), false),
            Err(e) => {
                warn!(error = %e, "stored notes are unreadable");
                (Vec::new(), true)
            }
        };
        info!(count = notes.len(), damaged, "loaded notes");
        Self {
            store,
            notes,
            damaged,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn save(&mut self) -> Result<(), PersistenceError> {
        if self.damaged {
            let suffix = format!("corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ"));
            if self.store.set_aside(NOTES_KEY, &suffix)? {
                warn!(key = NOTES_KEY, %suffix, "set aside damaged notes before saving");
            }
            self.damaged = false;
        }
        let value = serde_json::to_value(&self.notes)?;
        self.store.save(NOTES_KEY, &value)?;
        debug!(count = self.notes.len(), "saved notes");
        Ok(())
    }

    fn next_id(&self, now: DateTime<Utc>) -> NoteId {
        let candidate = now.timestamp_millis();
        match self.notes.iter().map(Note::id).max() {
            Some(max) if candidate <= max => max + 1,
            _ => candidate,
        }
    }
}

impl<S: KeyValueStore> NoteRepository for NoteCollection<S> {
    fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn create_note(&mut self, now: DateTime<Utc>) -> Result<Note, PersistenceError> {
        let note = Note::new_default(self.next_id(now), now);
        self.notes.insert(0, note.snapshot());
        if let Err(e) = self.save() {
            self.notes.remove(0);
            return Err(e);
        }
        info!(note_id = note.id(), "created note");
        Ok(note)
    }

    fn update_note(&mut self, note: &Note, now: DateTime<Utc>) -> Result<(), PersistenceError> {
        let slot = self
            .notes
            .iter_mut()
            .find(|n| n.id() == note.id())
            .ok_or(PersistenceError::NoteNotFound { id: note.id() })?;
        let mut stored = note.snapshot();
        stored.set_updated_at(now);
        *slot = stored;
        self.save()
    }

    fn delete_note(&mut self, id: NoteId) -> Result<bool, PersistenceError> {
        let before = self.notes.len();
        self.notes.retain(|n| n.id() != id);
        if self.notes.len() == before {
            return Ok(false);
        }
        self.save()?;
        info!(note_id = id, "deleted note");
        Ok(true)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
