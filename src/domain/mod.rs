//! Core types: Note, Section, and snapshot validation

mod note;
mod validation;

pub use note::{DEFAULT_SECTION_COUNT, Note, NoteId, Section, SectionId};
pub use validation::{ValidationError, note_from_state, validate_note, validate_state};
