//! Remove command handler.

use anyhow::{Context, Result, bail};
use std::io;
use std::path::Path;

use super::{PromptConfirm, SharedInput, open_notes};
use crate::cli::RemoveArgs;
use crate::cli::config::Config;
use crate::domain::{Note, NoteId};
use crate::editor::{Confirm, ConfirmRequest};
use crate::store::NoteRepository;

/// Deletes note `id` after `confirm` agrees, unless `skip_confirm` is set.
///
/// Returns the deleted note, or `None` if the user declined.
pub(crate) fn remove_note<R: NoteRepository, C: Confirm>(
    notes: &mut R,
    id: NoteId,
    skip_confirm: bool,
    confirm: &mut C,
) -> Result<Option<Note>> {
    let Some(note) = notes.find(id).map(Note::snapshot) else {
        bail!("note not found: {}", id);
    };

    if !skip_confirm && !confirm.confirm(&ConfirmRequest::delete_note(&note)) {
        return Ok(None);
    }

    notes
        .delete_note(id)
        .with_context(|| format!("failed to delete note {}", id))?;
    Ok(Some(note))
}

pub fn handle_remove(args: &RemoveArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let mut notes = open_notes(notes_dir, config)?;
    let mut confirm = PromptConfirm::new(SharedInput::new(io::stdin().lock()), io::stderr());

    match remove_note(&mut notes, args.id, args.yes, &mut confirm)? {
        Some(note) => println!("Deleted: {}", note),
        None => println!("Cancelled."),
    }
    Ok(())
}
