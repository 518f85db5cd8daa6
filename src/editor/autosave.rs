//! Debounced commits: many rapid edits become one history entry and one save.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Note, NoteId};
use crate::history::HistoryStore;
use crate::store::{NoteRepository, PersistenceError};

/// Default quiet period before a burst of edits is committed.
pub const DEFAULT_DEBOUNCE_MS: i64 = 300;

/// Holds a value until no new activity has arrived for `delay`.
///
/// Only the first value of a burst is kept; later calls to
/// [`schedule`](Self::schedule) just push the deadline out. That is what
/// makes a committed diff span the whole burst rather than the last
/// keystroke.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: DateTime<Utc>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Restarts the quiet period. Returns true if this started a new burst,
    /// in which case `value` is retained; otherwise it is dropped.
    pub fn schedule(&mut self, value: T, now: DateTime<Utc>) -> bool {
        let deadline = now + self.delay;
        if let Some(pending) = self.pending.as_mut() {
            pending.deadline = deadline;
            return false;
        }
        self.pending = Some(Pending { value, deadline });
        true
    }

    /// Returns the retained value once the deadline has passed.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Option<T> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if due {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }

    /// Drops the pending burst without firing, returning what was retained.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().map(|p| p.deadline)
    }
}

/// What happened when the autosave was polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing was pending.
    Idle,
    /// A burst is pending but still inside its quiet period.
    Waiting,
    /// The burst settled but left the note as it was.
    Unchanged,
    /// The pending snapshot belonged to another note and was dropped.
    Stale,
    /// The prior state was recorded and the note saved.
    Committed,
    /// The prior state was recorded but saving failed.
    SaveFailed,
}

/// A settled commit whose history entry was recorded but whose save failed.
#[derive(Debug, Error)]
#[error("note {note_id} was not saved: {source}")]
pub struct CommitError {
    pub note_id: NoteId,
    #[source]
    pub source: PersistenceError,
}

/// Turns bursts of edits on the working copy into history entries and saves.
#[derive(Debug)]
pub struct Autosave {
    timer: Debouncer<Note>,
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            timer: Debouncer::new(delay),
        }
    }

    /// Records `prior` (the working copy as it was before the edit) unless a
    /// burst is already pending, and restarts the quiet period.
    pub fn schedule_commit(&mut self, prior: Note, now: DateTime<Utc>) {
        if self.timer.schedule(prior, now) {
            debug!("autosave burst started");
        }
    }

    /// Abandons the pending burst. Its edits stay in the working copy but
    /// are neither recorded nor saved by this burst.
    pub fn cancel(&mut self) -> bool {
        let discarded = self.timer.cancel();
        if let Some(prior) = &discarded {
            debug!(note_id = prior.id(), "autosave burst cancelled");
        }
        discarded.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.timer.deadline()
    }

    /// Commits the pending burst if its quiet period has elapsed.
    ///
    /// The prior snapshot is compared with `working`; if they are equal
    /// nothing is recorded or saved. Otherwise the prior snapshot goes onto
    /// the undo stack and `working` is saved. A failed save is returned as a
    /// [`CommitError`] but the history entry stays and `working` is left
    /// untouched.
    pub fn settle<R: NoteRepository>(
        &mut self,
        now: DateTime<Utc>,
        working: &Note,
        history: &mut HistoryStore,
        repository: &mut R,
    ) -> Result<CommitOutcome, CommitError> {
        if !self.timer.is_pending() {
            return Ok(CommitOutcome::Idle);
        }
        let Some(prior) = self.timer.take_due(now) else {
            return Ok(CommitOutcome::Waiting);
        };

        if prior.id() != working.id() {
            warn!(
                prior_id = prior.id(),
                working_id = working.id(),
                "dropping autosave for a note that is no longer open"
            );
            return Ok(CommitOutcome::Stale);
        }

        if prior == *working {
            debug!(note_id = working.id(), "burst settled without changes");
            return Ok(CommitOutcome::Unchanged);
        }

        history.push(&prior);
        match repository.update_note(working, now) {
            Ok(()) => {
                info!(note_id = working.id(), "committed edit");
                Ok(CommitOutcome::Committed)
            }
            Err(source) => {
                warn!(note_id = working.id(), error = %source, "commit recorded but not saved");
                Err(CommitError {
                    note_id: working.id(),
                    source,
                })
            }
        }
    }
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_DEBOUNCE_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, NoteCollection};
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn ms(n: i64) -> Duration {
        Duration::milliseconds(n)
    }

    #[test]
    fn debouncer_fires_after_quiet_period() {
        let mut debouncer = Debouncer::new(ms(300));
        assert!(debouncer.schedule("first", t0()));
        assert_eq!(debouncer.take_due(t0() + ms(299)), None);
        assert_eq!(debouncer.take_due(t0() + ms(300)), Some("first"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn debouncer_keeps_first_value_and_extends_deadline() {
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.schedule(1, t0());
        assert!(!debouncer.schedule(2, t0() + ms(200)));
        assert_eq!(debouncer.deadline(), Some(t0() + ms(500)));
        assert_eq!(debouncer.take_due(t0() + ms(400)), None);
        assert_eq!(debouncer.take_due(t0() + ms(500)), Some(1));
    }

    #[test]
    fn debouncer_cancel_discards() {
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.schedule("x", t0());
        assert_eq!(debouncer.cancel(), Some("x"));
        assert_eq!(debouncer.take_due(t0() + ms(1000)), None);
        assert_eq!(debouncer.cancel(), None);
    }

    fn setup() -> (NoteCollection<MemoryStore>, Note) {
        let mut repo = NoteCollection::load(MemoryStore::new("test"));
        let note = repo.create_note(t0()).unwrap();
        (repo, note)
    }

    #[test]
    fn settle_commits_changed_note() {
        let (mut repo, mut working) = setup();
        let mut history = HistoryStore::new();
        let mut autosave = Autosave::new(ms(300));

        autosave.schedule_commit(working.snapshot(), t0());
        working.set_title("Hello");

        assert_eq!(
            autosave
                .settle(t0() + ms(100), &working, &mut history, &mut repo)
                .unwrap(),
            CommitOutcome::Waiting
        );
        assert_eq!(
            autosave
                .settle(t0() + ms(300), &working, &mut history, &mut repo)
                .unwrap(),
            CommitOutcome::Committed
        );
        assert_eq!(history.undo_len(), 1);
        assert_eq!(repo.find(working.id()).unwrap().title(), "Hello");
        assert_eq!(
            autosave
                .settle(t0() + ms(900), &working, &mut history, &mut repo)
                .unwrap(),
            CommitOutcome::Idle
        );
    }

    #[test]
    fn settle_skips_reverted_edits() {
        let (mut repo, mut working) = setup();
        let mut history = HistoryStore::new();
        let mut autosave = Autosave::new(ms(300));
        let saves_before = repo.store().save_count();

        let section = working.sections()[1].id();
        autosave.schedule_commit(working.snapshot(), t0());
        working.section_mut(section).unwrap().toggle();
        autosave.schedule_commit(working.snapshot(), t0() + ms(50));
        working.section_mut(section).unwrap().toggle();

        let outcome = autosave
            .settle(t0() + ms(400), &working, &mut history, &mut repo)
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Unchanged);
        assert_eq!(history.undo_len(), 0);
        assert_eq!(repo.store().save_count(), saves_before);
    }

    #[test]
    fn settle_reports_failed_save_but_keeps_history() {
        let (mut repo, mut working) = setup();
        let mut history = HistoryStore::new();
        let mut autosave = Autosave::new(ms(300));
        repo.store_mut().set_fail_saves(true);

        autosave.schedule_commit(working.snapshot(), t0());
        working.set_title("offline edit");

        let err = autosave
            .settle(t0() + ms(300), &working, &mut history, &mut repo)
            .unwrap_err();
        assert_eq!(err.note_id, working.id());
        assert_eq!(history.undo_len(), 1);
        assert_eq!(working.title(), "offline edit");
    }

    #[test]
    fn settle_drops_snapshot_of_another_note() {
        let (mut repo, working) = setup();
        let other = repo.create_note(t0()).unwrap();
        let mut history = HistoryStore::new();
        let mut autosave = Autosave::new(ms(300));

        autosave.schedule_commit(working.snapshot(), t0());
        let outcome = autosave
            .settle(t0() + ms(300), &other, &mut history, &mut repo)
            .unwrap();
        assert_eq!(outcome, CommitOutcome::Stale);
        assert_eq!(history.undo_len(), 0);
    }

    #[test]
    fn cancel_reports_whether_anything_was_pending() {
        let mut autosave = Autosave::default();
        assert!(!autosave.cancel());
        autosave.schedule_commit(Note::new(1, "", t0()), t0());
        assert_eq!(autosave.deadline(), Some(t0() + ms(DEFAULT_DEBOUNCE_MS)));
        assert!(autosave.cancel());
        assert!(!autosave.is_pending());
    }
}
