//! Command handlers for the CLI.

mod edit;
mod list;
mod new;
mod remove;
mod show;
mod terminal;


use anyhow::Result;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;

use crate::cli::config::Config;
use crate::editor::{Confirm, ConfirmRequest};
use crate::store::{KeyValueStore, NoteCollection};

// Re-export public items
pub use edit::handle_edit;
pub use list::handle_list;
pub use new::handle_new;
pub use remove::handle_remove;
pub use show::handle_show;

// Re-export for tests
#[cfg(test)]
pub(crate) use edit::{FocusTarget, ReplCommand, parse_command, run_repl};
#[cfg(test)]
pub(crate) use remove::remove_note;
#[cfg(test)]
pub(crate) use show::format_note;
#[cfg(test)]
pub(crate) use terminal::TerminalPresenter;

/// The note collection as the CLI opens it.
pub(crate) type Notes = NoteCollection<Box<dyn KeyValueStore>>;

// ===========================================
// Shared Utilities
// ===========================================

/// Opens the configured store in `notes_dir` and loads every note from it.
pub(crate) fn open_notes(notes_dir: &Path, config: &Config) -> Result<Notes> {
    let store = config.open_store(notes_dir)?;
    Ok(NoteCollection::load(store))
}

/// Truncates a string to a maximum display width, adding ellipsis if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

/// A line reader that several consumers can take turns on.
///
/// The edit loop and its confirmation prompt both read from stdin; sharing
/// one buffered reader keeps either from swallowing the other's input.
pub(crate) struct SharedInput<I>(Rc<RefCell<I>>);

impl<I: BufRead> SharedInput<I> {
    pub(crate) fn new(input: I) -> Self {
        Self(Rc::new(RefCell::new(input)))
    }

    /// Reads one line without its terminator, or `None` at end of input.
    pub(crate) fn next_line(&self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.0.borrow_mut().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

impl<I> Clone for SharedInput<I> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

/// Asks on `prompt` and reads the answer from `input`. Anything but `y` or
/// `yes` declines, including end of input.
pub(crate) struct PromptConfirm<I, W> {
    input: SharedInput<I>,
    prompt: W,
}

impl<I: BufRead, W: Write> PromptConfirm<I, W> {
    pub(crate) fn new(input: SharedInput<I>, prompt: W) -> Self {
        Self { input, prompt }
    }
}

impl<I: BufRead, W: Write> Confirm for PromptConfirm<I, W> {
    fn confirm(&mut self, request: &ConfirmRequest) -> bool {
        let asked = write!(
            self.prompt,
            "{}: {} [{}: y / {}: N] ",
            request.title, request.message, request.confirm_text, request.cancel_text
        )
        .and_then(|()| self.prompt.flush());
        if asked.is_err() {
            return false;
        }
        match self.input.next_line() {
            Ok(Some(answer)) => {
                let answer = answer.trim();
                answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
            }
            _ => false,
        }
    }
}
