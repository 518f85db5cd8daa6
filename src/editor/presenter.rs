//! Seams to the user-facing layer: drawing, error display and confirmation.

use thiserror::Error;

use crate::domain::{Note, NoteId};
use crate::store::PersistenceError;

use super::reconcile::{EditorSurface, RenderContext};

/// Recoverable failures surfaced to the user. None of these stop editing.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("changes to note {id} are not saved yet: {source}")]
    Save {
        id: NoteId,
        #[source]
        source: PersistenceError,
    },

    #[error("could not create note: {0}")]
    Create(#[source] PersistenceError),

    #[error("could not delete note {id}: {source}")]
    Delete {
        id: NoteId,
        #[source]
        source: PersistenceError,
    },
}

/// Draws notes and the note list, and shows errors.
///
/// The presenter is also the [`EditorSurface`] whose focus and scroll are
/// preserved across rebuilding renders.
pub trait Presenter: EditorSurface {
    fn render(&mut self, note: &Note, ctx: &RenderContext);

    fn render_list(&mut self, notes: &[&Note], search_term: &str);

    fn report_error(&mut self, error: EditorError);
}

/// The text of a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
}

impl ConfirmRequest {
    pub fn delete_note(note: &Note) -> Self {
        Self {
            title: "Delete note".to_string(),
            message: format!(
                "Are you sure you want to delete \"{}\"? This cannot be undone.",
                note.display_title()
            ),
            confirm_text: "Delete".to_string(),
            cancel_text: "Cancel".to_string(),
        }
    }
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    /// Returns true only if the user explicitly confirmed.
    fn confirm(&mut self, request: &ConfirmRequest) -> bool;
}

impl<F: FnMut(&ConfirmRequest) -> bool> Confirm for F {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}
