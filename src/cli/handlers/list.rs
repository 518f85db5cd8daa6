//! List command handler.

use anyhow::Result;
use std::path::Path;

use super::{open_notes, truncate_str};
use crate::cli::ListArgs;
use crate::cli::config::Config;
use crate::cli::output::{NoteListing, Output, OutputFormat, PREVIEW_CHARS};
use crate::store::NoteRepository;

pub fn handle_list(args: &ListArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let notes = open_notes(notes_dir, config)?;
    let term = args.search.as_deref().unwrap_or("");
    let matches = notes.search(term);

    match args.format {
        OutputFormat::Human => {
            if matches.is_empty() {
                if term.is_empty() {
                    println!("No notes found.");
                } else {
                    println!("No notes match '{}'.", term);
                }
            } else {
                println!("{:<15}  {:<40}  {:>10}", "ID", "Title", "Modified");
                println!(
                    "{:<15}  {:<40}  {:>10}",
                    "---------------",
                    "----------------------------------------",
                    "----------"
                );

                for note in &matches {
                    let title = truncate_str(note.display_title(), 40);
                    let modified = note.updated_at().format("%Y-%m-%d").to_string();
                    println!("{:<15}  {:<40}  {:>10}", note.id(), title, modified);
                    println!("{:<15}  {}", "", note.preview(PREVIEW_CHARS));
                }

                println!();
                println!("{} note(s)", matches.len());
            }
        }
        OutputFormat::Json => {
            let listings: Vec<NoteListing> = matches.iter().map(|n| NoteListing::from(*n)).collect();
            let output = Output::new(listings);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
