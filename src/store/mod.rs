//! Key-value persistence backends and the note collection

mod collection;
mod json_file;
mod kv;
mod sqlite;

pub use collection::{NOTES_KEY, NoteCollection, NoteRepository, PersistenceError};
pub use json_file::JsonFileStore;
pub use kv::{KeyValueStore, MemoryStore, StoreError};
pub use sqlite::SqliteStore;
