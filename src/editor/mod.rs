//! Editing a single note: autosave, undo/redo and view reconciliation.

mod autosave;
mod clock;
mod presenter;
mod reconcile;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use autosave::{Autosave, CommitError, CommitOutcome, DEFAULT_DEBOUNCE_MS, Debouncer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use presenter::{Confirm, ConfirmRequest, EditorError, Presenter};
pub use reconcile::{
    AutoGrow, EditorSurface, FieldRef, FocusState, GrowableField, RenderContext, RenderKind,
    Selection, ViewState, capture, render_with_reconcile, restore,
};
pub use session::{EditSession, SessionConfig, SessionState};
