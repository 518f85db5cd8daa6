//! Interactive edit command.
//!
//! Reads one command per line and drives an [`EditSession`]. The session's
//! autosave is polled before every command, so edits typed in quick
//! succession land in a single undo step.

use anyhow::{Context, Result, bail};
use chrono::Duration;
use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::debug;

use super::terminal::{MAX_CONTENT_ROWS, TerminalPresenter};
use super::{Notes, PromptConfirm, SharedInput, open_notes};
use crate::cli::EditArgs;
use crate::cli::config::Config;
use crate::domain::{NoteId, SectionId};
use crate::editor::{Confirm, EditSession, EditorSurface, FieldRef, Selection};
use crate::store::NoteRepository;

const HELP: &str = "\
commands:
  title <text>             set the note title
  stitle <n> <text>        set section n's title
  content <n> <text>       replace section n's content (\\n for newline)
  append <n> <text>        add a line to section n's content
  toggle <n>               open or close section n
  add                      add a section
  undo | redo              step through saved changes
  focus title [pos]        put the cursor in the title
  focus stitle <n> [pos]   put the cursor in section n's title
  focus content <n> [pos]  put the cursor in section n's content
  show                     print the note
  history                  print the undo and redo stacks
  wait                     save pending changes now
  delete                   delete this note
  quit                     save and leave";

/// One parsed line of editor input. Sections are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReplCommand {
    Title(String),
    SectionTitle(usize, String),
    Content(usize, String),
    Append(usize, String),
    Toggle(usize),
    Add,
    Undo,
    Redo,
    Focus(FocusTarget, Option<usize>),
    Show,
    History,
    Wait,
    Delete,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FocusTarget {
    Title,
    SectionTitle(usize),
    SectionContent(usize),
}

pub(crate) fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim_start();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let command = match word.trim_end() {
        "" => ReplCommand::Empty,
        "title" => ReplCommand::Title(rest.to_string()),
        "stitle" => {
            let (n, text) = section_and_text(rest)?;
            ReplCommand::SectionTitle(n, text)
        }
        "content" => {
            let (n, text) = section_and_text(rest)?;
            ReplCommand::Content(n, unescape(&text))
        }
        "append" => {
            let (n, text) = section_and_text(rest)?;
            ReplCommand::Append(n, unescape(&text))
        }
        "toggle" => ReplCommand::Toggle(section_number(rest.trim())?),
        "add" => ReplCommand::Add,
        "undo" => ReplCommand::Undo,
        "redo" => ReplCommand::Redo,
        "focus" => parse_focus(rest)?,
        "show" => ReplCommand::Show,
        "history" => ReplCommand::History,
        "wait" => ReplCommand::Wait,
        "delete" => ReplCommand::Delete,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "close" => ReplCommand::Quit,
        other => return Err(format!("unknown command '{}' (try 'help')", other)),
    };
    Ok(command)
}

fn parse_focus(rest: &str) -> Result<ReplCommand, String> {
    let mut words = rest.split_whitespace();
    let target = match words.next() {
        Some("title") => FocusTarget::Title,
        Some("stitle") => FocusTarget::SectionTitle(section_number(words.next().unwrap_or(""))?),
        Some("content") => {
            FocusTarget::SectionContent(section_number(words.next().unwrap_or(""))?)
        }
        _ => return Err("focus needs 'title', 'stitle <n>' or 'content <n>'".to_string()),
    };
    let position = match words.next() {
        Some(pos) => Some(
            pos.parse()
                .map_err(|_| format!("invalid cursor position '{}'", pos))?,
        ),
        None => None,
    };
    Ok(ReplCommand::Focus(target, position))
}

fn section_and_text(rest: &str) -> Result<(usize, String), String> {
    let (n, text) = rest.split_once(' ').unwrap_or((rest, ""));
    Ok((section_number(n)?, text.to_string()))
}

fn section_number(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a section number, got '{}'", s)),
    }
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Runs editor commands from `input` until it ends or the user quits.
///
/// Pending changes are settled before returning; `sleep` is how the loop
/// waits out the autosave quiet period.
pub(crate) fn run_repl<R, W, C, I>(
    session: &mut EditSession<R, TerminalPresenter<W>, C>,
    input: &SharedInput<I>,
    sleep: &mut dyn FnMut(Duration),
) -> Result<()>
where
    R: NoteRepository,
    W: Write,
    C: Confirm,
    I: BufRead,
{
    loop {
        session.tick();
        let Some(line) = input.next_line().context("failed to read input")? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(msg) => {
                session.presenter_mut().line(format_args!("error: {}", msg));
                continue;
            }
        };
        debug!(?command, "editor command");

        match command {
            ReplCommand::Quit => break,
            ReplCommand::Delete => {
                if session.delete_current_note() {
                    return Ok(());
                }
                session.presenter_mut().line(format_args!("Delete cancelled."));
            }
            other => execute(session, other, sleep),
        }
    }

    settle(session, sleep);
    session.close_editor();
    Ok(())
}

fn execute<R, W, C>(
    session: &mut EditSession<R, TerminalPresenter<W>, C>,
    command: ReplCommand,
    sleep: &mut dyn FnMut(Duration),
) where
    R: NoteRepository,
    W: Write,
    C: Confirm,
{
    match command {
        ReplCommand::Title(text) => {
            session.set_title(&text);
        }
        ReplCommand::SectionTitle(n, text) => {
            if let Some(id) = section_id(session, n) {
                session.set_section_title(id, &text);
            }
        }
        ReplCommand::Content(n, text) => {
            if let Some(id) = section_id(session, n) {
                session.set_section_content(id, &text);
            }
        }
        ReplCommand::Append(n, text) => {
            if let Some(id) = section_id(session, n) {
                let content = session
                    .working_copy()
                    .and_then(|note| note.section(id))
                    .map(|s| s.content().to_string())
                    .unwrap_or_default();
                let content = if content.is_empty() {
                    text
                } else {
                    format!("{}\n{}", content, text)
                };
                session.set_section_content(id, &content);
            }
        }
        ReplCommand::Toggle(n) => {
            if let Some(id) = section_id(session, n) {
                session.toggle_section(id);
            }
        }
        ReplCommand::Add => {
            session.add_section();
        }
        ReplCommand::Undo => {
            if !session.undo() {
                session.presenter_mut().line(format_args!("Nothing to undo."));
            }
        }
        ReplCommand::Redo => {
            if !session.redo() {
                session.presenter_mut().line(format_args!("Nothing to redo."));
            }
        }
        ReplCommand::Focus(target, position) => focus(session, target, position),
        ReplCommand::Show => session.redraw(),
        ReplCommand::History => print_history(session),
        ReplCommand::Wait => {
            if !settle(session, sleep) {
                session.presenter_mut().line(format_args!("Nothing to save."));
            }
        }
        ReplCommand::Help => session.presenter_mut().line(format_args!("{}", HELP)),
        ReplCommand::Empty | ReplCommand::Delete | ReplCommand::Quit => {}
    }
}

/// Waits for the pending burst's deadline and commits it. Returns false if
/// nothing was pending.
fn settle<R, W, C>(
    session: &mut EditSession<R, TerminalPresenter<W>, C>,
    sleep: &mut dyn FnMut(Duration),
) -> bool
where
    R: NoteRepository,
    W: Write,
    C: Confirm,
{
    let Some(remaining) = session.time_until_settle() else {
        return false;
    };
    if remaining > Duration::zero() {
        sleep(remaining);
    }
    session.tick();
    true
}

fn section_id<R, W, C>(
    session: &mut EditSession<R, TerminalPresenter<W>, C>,
    n: usize,
) -> Option<SectionId>
where
    R: NoteRepository,
    W: Write,
    C: Confirm,
{
    let id = session
        .working_copy()
        .and_then(|note| note.sections().get(n - 1))
        .map(|s| s.id());
    if id.is_none() {
        session
            .presenter_mut()
            .line(format_args!("error: no section {}", n));
    }
    id
}

fn focus<R, W, C>(
    session: &mut EditSession<R, TerminalPresenter<W>, C>,
    target: FocusTarget,
    position: Option<usize>,
) where
    R: NoteRepository,
    W: Write,
    C: Confirm,
{
    let field = match target {
        FocusTarget::Title => FieldRef::Title,
        FocusTarget::SectionTitle(n) => match section_id(session, n) {
            Some(id) => FieldRef::SectionTitle(id),
            None => return,
        },
        FocusTarget::SectionContent(n) => match section_id(session, n) {
            Some(id) => FieldRef::SectionContent(id),
            None => return,
        },
    };

    let presenter = session.presenter_mut();
    let Some(len) = presenter.content_len(field) else {
        presenter.line(format_args!("error: that field is not shown"));
        return;
    };
    presenter.focus(field);
    let selection = Selection::caret(position.unwrap_or(len)).clamped(len);
    presenter.set_selection(field, selection);
}

fn print_history<R, W, C>(session: &mut EditSession<R, TerminalPresenter<W>, C>)
where
    R: NoteRepository,
    W: Write,
    C: Confirm,
{
    let summary = session.history().debug_summary();
    let presenter = session.presenter_mut();
    presenter.line(format_args!(
        "history (capacity {}): {} undo, {} redo",
        summary.capacity,
        summary.undo.len(),
        summary.redo.len()
    ));
    for (label, entries) in [("undo", &summary.undo), ("redo", &summary.redo)] {
        for entry in entries.iter().rev() {
            presenter.line(format_args!(
                "  {} {}  \"{}\"  {} section(s)",
                label,
                entry.timestamp.format("%H:%M:%S%.3f"),
                entry.title,
                entry.section_count
            ));
        }
    }
}

/// Opens note `id` from `notes` in an interactive session on stdin/stdout.
pub(crate) fn edit_note(notes: Notes, id: NoteId, config: &Config) -> Result<()> {
    let input = SharedInput::new(io::stdin().lock());
    let confirm = PromptConfirm::new(input.clone(), io::stderr());
    let presenter = TerminalPresenter::new(io::stdout(), Some(MAX_CONTENT_ROWS));
    let mut session = EditSession::new(notes, presenter, confirm, config.session_config());
    session
        .history_mut()
        .subscribe(|status| debug!(?status, "history changed"));

    if !session.open_note(id) {
        bail!("note not found: {}", id);
    }
    session
        .presenter_mut()
        .line(format_args!("Type 'help' for commands."));

    run_repl(&mut session, &input, &mut |d| {
        if let Ok(d) = d.to_std() {
            std::thread::sleep(d);
        }
    })
}

pub fn handle_edit(args: &EditArgs, notes_dir: &Path, config: &Config) -> Result<()> {
    let notes = open_notes(notes_dir, config)?;
    edit_note(notes, args.id, config)
}
