//! Show command handler.

use anyhow::{Result, bail};
use std::path::Path;

use super::open_notes;
use crate::cli::ShowArgs;
use crate::cli::config::Config;
use crate::cli::output::{Output, OutputFormat};
use crate::domain::Note;
use crate::store::NoteRepository;

pub fn handle_show(args: &ShowArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let notes = open_notes(notes_dir, config)?;
    let Some(note) = notes.find(args.id) else {
        bail!("note not found: {}", args.id);
    };

    match args.format {
        OutputFormat::Human => print!("{}", format_note(note)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&Output::new(note))?);
        }
    }
    Ok(())
}

/// Renders every section, open or not, as plain text.
pub(crate) fn format_note(note: &Note) -> String {
    let mut out = format!("# {}\n\n", note.display_title());
    out.push_str(&format!(
        "ID: {}  Created: {}  Modified: {}\n",
        note.id(),
        note.created_at().format("%Y-%m-%d %H:%M"),
        note.updated_at().format("%Y-%m-%d %H:%M"),
    ));

    for section in note.sections() {
        let marker = if section.is_open() { "▾" } else { "▸" };
        out.push_str(&format!("\n{} {}\n", marker, section.title()));
        for line in section.content().lines() {
            out.push_str(&format!("  {}\n", line));
        }
    }
    out
}
