//! New note command handler.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;

use super::edit::edit_note;
use super::open_notes;
use crate::cli::NewArgs;
use crate::cli::config::Config;
use crate::cli::output::{Output, OutputFormat};
use crate::store::NoteRepository;

pub fn handle_new(args: &NewArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let mut notes = open_notes(notes_dir, config)?;
    let now = Utc::now();

    let mut note = notes
        .create_note(now)
        .with_context(|| format!("failed to create note in {}", notes_dir.display()))?;

    if let Some(title) = args.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        note.set_title(title);
        notes
            .update_note(&note, now)
            .with_context(|| "failed to save note title")?;
    }

    match args.format {
        OutputFormat::Human => println!("Created: {}", note),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&Output::new(&note))?);
        }
    }

    if args.edit {
        edit_note(notes, note.id(), config)?;
    }

    Ok(())
}
