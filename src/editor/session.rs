//! The per-note editing context.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::domain::{Note, NoteId, SectionId};
use crate::history::{DEFAULT_CAPACITY, HistoryStore};
use crate::store::NoteRepository;

use super::autosave::{Autosave, CommitOutcome, DEFAULT_DEBOUNCE_MS};
use super::clock::{Clock, SystemClock};
use super::presenter::{Confirm, ConfirmRequest, EditorError, Presenter};
use super::reconcile::{RenderContext, RenderKind, render_with_reconcile};

/// Tunables for an [`EditSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Quiet period before a burst of edits is committed.
    pub debounce: Duration,
    /// Maximum entries per history stack.
    pub history_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::milliseconds(DEFAULT_DEBOUNCE_MS),
            history_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No note is open.
    Closed,
    /// A note is open and everything is committed.
    Open,
    /// A note is open and a burst of edits is waiting to settle.
    Pending,
}

/// Routes user edits on the open note through autosave and history.
///
/// The session owns the working copy. Edits are applied to it immediately;
/// recording and saving are deferred until the edit burst settles, which
/// happens on the first [`tick`](Self::tick) after the quiet period.
/// Undo and redo skip the quiet period and save at once.
///
/// Every operation that needs an open note returns `false` or `None` when
/// none is open rather than failing.
pub struct EditSession<R, V, D> {
    repository: R,
    presenter: V,
    confirm: D,
    clock: Box<dyn Clock>,
    history: HistoryStore,
    autosave: Autosave,
    working: Option<Note>,
}

impl<R, V, D> EditSession<R, V, D>
where
    R: NoteRepository,
    V: Presenter,
    D: Confirm,
{
    pub fn new(repository: R, presenter: V, confirm: D, config: SessionConfig) -> Self {
        Self {
            repository,
            presenter,
            confirm,
            clock: Box::new(SystemClock),
            history: HistoryStore::with_capacity(config.history_capacity),
            autosave: Autosave::new(config.debounce),
            working: None,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> SessionState {
        match (&self.working, self.autosave.is_pending()) {
            (None, _) => SessionState::Closed,
            (Some(_), false) => SessionState::Open,
            (Some(_), true) => SessionState::Pending,
        }
    }

    /// The note being edited, if any.
    pub fn working_copy(&self) -> Option<&Note> {
        self.working.as_ref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn presenter(&self) -> &V {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut V {
        &mut self.presenter
    }

    /// When the pending burst will settle, if one is pending.
    pub fn pending_deadline(&self) -> Option<DateTime<Utc>> {
        self.autosave.deadline()
    }

    /// How long until the pending burst settles; zero once it is due.
    pub fn time_until_settle(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.pending_deadline()
            .map(|deadline| (deadline - now).max(Duration::zero()))
    }

    // ===========================================
    // Opening and closing
    // ===========================================

    /// Opens the stored note with `id`. Returns false if there is none.
    pub fn open_note(&mut self, id: NoteId) -> bool {
        let Some(note) = self.repository.find(id).map(Note::snapshot) else {
            debug!(note_id = id, "open ignored: no such note");
            return false;
        };
        self.open_editor(&note);
        true
    }

    /// Starts editing a copy of `note` with an empty history.
    pub fn open_editor(&mut self, note: &Note) {
        self.autosave.cancel();
        self.working = Some(note.snapshot());
        self.history.clear();
        info!(note_id = note.id(), "opened note");
        self.render(RenderKind::Rebuild);
    }

    /// Stops editing and shows the note list.
    ///
    /// A burst that has not settled yet is abandoned: its edits are not
    /// recorded or saved.
    pub fn close_editor(&mut self) {
        self.autosave.cancel();
        if let Some(note) = self.working.take() {
            info!(note_id = note.id(), "closed note");
        }
        self.history.clear();
        self.show_list("");
    }

    /// Creates a note and opens it. Returns its id, or `None` if it could not
    /// be saved.
    pub fn new_note(&mut self) -> Option<NoteId> {
        let now = self.clock.now();
        match self.repository.create_note(now) {
            Ok(note) => {
                self.open_editor(&note);
                Some(note.id())
            }
            Err(e) => {
                self.presenter.report_error(EditorError::Create(e));
                None
            }
        }
    }

    /// Deletes the open note after confirmation, then closes the editor.
    ///
    /// Returns false if nothing is open or the user declined.
    pub fn delete_current_note(&mut self) -> bool {
        let Some(note) = self.working.as_ref() else {
            return false;
        };
        let id = note.id();
        let request = ConfirmRequest::delete_note(note);
        if !self.confirm.confirm(&request) {
            debug!(note_id = id, "delete declined");
            return false;
        }

        self.autosave.cancel();
        if let Err(source) = self.repository.delete_note(id) {
            self.presenter
                .report_error(EditorError::Delete { id, source });
        }
        self.close_editor();
        true
    }

    /// Shows the stored notes matching `term`.
    pub fn show_list(&mut self, term: &str) {
        let notes = self.repository.search(term);
        self.presenter.render_list(&notes, term);
    }

    // ===========================================
    // Field edits
    // ===========================================

    pub fn set_title(&mut self, title: &str) -> bool {
        self.mutate(None, |note| {
            note.set_title(title);
            true
        })
    }

    pub fn set_section_title(&mut self, id: SectionId, title: &str) -> bool {
        self.mutate(None, |note| match note.section_mut(id) {
            Some(section) => {
                section.set_title(title);
                true
            }
            None => false,
        })
    }

    pub fn set_section_content(&mut self, id: SectionId, content: &str) -> bool {
        self.mutate(None, |note| match note.section_mut(id) {
            Some(section) => {
                section.set_content(content);
                true
            }
            None => false,
        })
    }

    /// Opens or closes a section. Returns false if no such section exists.
    pub fn toggle_section(&mut self, id: SectionId) -> bool {
        self.mutate(Some(RenderKind::Refresh), |note| match note.section_mut(id) {
            Some(section) => {
                section.toggle();
                true
            }
            None => false,
        })
    }

    /// Appends a new open section and returns its id.
    pub fn add_section(&mut self) -> Option<SectionId> {
        let candidate = self.clock.now().timestamp_millis();
        let mut added = None;
        self.mutate(Some(RenderKind::Rebuild), |note| {
            added = Some(note.append_section(candidate));
            true
        });
        added
    }

    fn mutate(
        &mut self,
        render: Option<RenderKind>,
        apply: impl FnOnce(&mut Note) -> bool,
    ) -> bool {
        let now = self.clock.now();
        let Some(working) = self.working.as_mut() else {
            debug!("edit ignored: no note open");
            return false;
        };

        let prior = working.snapshot();
        if !apply(working) {
            debug!(note_id = working.id(), "edit ignored: no such section");
            return false;
        }
        self.autosave.schedule_commit(prior, now);

        if let Some(kind) = render {
            self.render(kind);
        }
        true
    }

    // ===========================================
    // Commit and history
    // ===========================================

    /// Commits the pending burst if its quiet period has elapsed.
    ///
    /// Hosts call this from their event loop; it is cheap when nothing is
    /// pending.
    pub fn tick(&mut self) -> CommitOutcome {
        let now = self.clock.now();
        let Some(working) = self.working.as_ref() else {
            return CommitOutcome::Idle;
        };

        let outcome = match self
            .autosave
            .settle(now, working, &mut self.history, &mut self.repository)
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.presenter.report_error(EditorError::Save {
                    id: e.note_id,
                    source: e.source,
                });
                CommitOutcome::SaveFailed
            }
        };

        if matches!(outcome, CommitOutcome::Committed | CommitOutcome::SaveFailed) {
            self.render(RenderKind::Refresh);
        }
        outcome
    }

    /// Steps the working copy back one committed edit.
    pub fn undo(&mut self) -> bool {
        let Some(working) = self.working.as_ref() else {
            return false;
        };
        match self.history.undo(Some(working)) {
            Some(restored) => {
                self.apply_history_step(restored);
                true
            }
            None => {
                debug!("nothing to undo");
                false
            }
        }
    }

    /// Re-applies the edit most recently undone.
    pub fn redo(&mut self) -> bool {
        let Some(working) = self.working.as_ref() else {
            return false;
        };
        match self.history.redo(Some(working)) {
            Some(restored) => {
                self.apply_history_step(restored);
                true
            }
            None => {
                debug!("nothing to redo");
                false
            }
        }
    }

    fn apply_history_step(&mut self, restored: Note) {
        self.autosave.cancel();
        let id = restored.id();
        self.working = Some(restored);
        self.save_now();
        debug!(note_id = id, "applied history step");
        self.render(RenderKind::History);
    }

    fn save_now(&mut self) {
        let now = self.clock.now();
        let Some(working) = self.working.as_ref() else {
            return;
        };
        if let Err(source) = self.repository.update_note(working, now) {
            self.presenter.report_error(EditorError::Save {
                id: working.id(),
                source,
            });
        }
    }

    /// Draws the open note again without rebuilding its fields.
    pub fn redraw(&mut self) {
        self.render(RenderKind::Refresh);
    }

    fn render(&mut self, kind: RenderKind) {
        let Some(note) = self.working.as_ref() else {
            return;
        };
        let ctx = RenderContext {
            kind,
            history: self.history.status(),
        };
        render_with_reconcile(&mut self.presenter, note, &ctx);
    }
}
