//! A line-oriented presenter for the interactive editor.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use tracing::warn;

use crate::domain::Note;
use crate::editor::{
    AutoGrow, EditorError, EditorSurface, FieldRef, GrowableField, Presenter, RenderContext,
    RenderKind, Selection,
};

/// Content rows shown per open section before the rest is elided.
pub(crate) const MAX_CONTENT_ROWS: u32 = 12;

/// Prints notes as text and keeps a model of the editable fields so focus,
/// selection and scroll can be reconciled like a graphical editor would.
pub(crate) struct TerminalPresenter<W> {
    out: W,
    fields: HashMap<FieldRef, String>,
    selections: HashMap<FieldRef, Selection>,
    focused: Option<FieldRef>,
    scroll: u32,
    grow: AutoGrow,
}

impl<W: Write> TerminalPresenter<W> {
    pub(crate) fn new(out: W, max_rows: Option<u32>) -> Self {
        Self {
            out,
            fields: HashMap::new(),
            selections: HashMap::new(),
            focused: None,
            scroll: 0,
            grow: AutoGrow::new(max_rows),
        }
    }

    #[cfg(test)]
    pub(crate) fn output(&self) -> &W {
        &self.out
    }

    /// Writes one line. Terminal write failures are logged, not raised.
    pub(crate) fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", args) {
            warn!(error = %e, "failed to write to terminal");
        }
    }

    fn rebuild_fields(&mut self, note: &Note) {
        self.fields.clear();
        self.selections.clear();
        self.focused = None;
        self.scroll = 0;
        self.sync_fields(note);
    }

    fn sync_fields(&mut self, note: &Note) {
        self.fields.insert(FieldRef::Title, note.title().to_string());
        for section in note.sections() {
            self.fields
                .insert(FieldRef::SectionTitle(section.id()), section.title().to_string());
            self.fields.insert(
                FieldRef::SectionContent(section.id()),
                section.content().to_string(),
            );
        }
    }

    /// Describes the focused field in terms the edit commands use.
    pub(crate) fn focus_label(&self, note: &Note) -> Option<String> {
        let field = self.focused?;
        let position = |id| {
            note.sections()
                .iter()
                .position(|s| s.id() == id)
                .map(|i| i + 1)
        };
        let name = match field {
            FieldRef::Title => "title".to_string(),
            FieldRef::SectionTitle(id) => format!("section {} title", position(id)?),
            FieldRef::SectionContent(id) => format!("section {} content", position(id)?),
        };
        Some(match self.selections.get(&field) {
            Some(sel) if sel.start == sel.end => format!("{} @{}", name, sel.start),
            Some(sel) => format!("{} @{}..{}", name, sel.start, sel.end),
            None => name,
        })
    }

    fn print_note(&mut self, note: &Note, ctx: &RenderContext) {
        let full = ctx.kind != RenderKind::Refresh;
        self.line(format_args!("== {} ==", note));
        for (index, section) in note.sections().iter().enumerate() {
            let marker = if section.is_open() { "▾" } else { "▸" };
            self.line(format_args!("{}. {} {}", index + 1, marker, section.title()));
            if full && section.is_open() {
                self.print_content(FieldRef::SectionContent(section.id()), section.content());
            }
        }
        if let Some(label) = self.focus_label(note) {
            self.line(format_args!("focus: {}", label));
        }
        self.line(format_args!(
            "-- undo: {} | redo: {}",
            ctx.history.undo_len, ctx.history.redo_len
        ));
    }

    fn print_content(&mut self, field: FieldRef, content: &str) {
        let mut area = ContentArea {
            rows: content.lines().count().max(1) as u32,
            height: 0,
            selection: self.selections.get(&field).copied(),
        };
        let height = self.grow.fit(&mut area) as usize;
        if let Some(selection) = area.selection {
            self.selections.insert(field, selection);
        }

        let lines: Vec<&str> = content.lines().collect();
        for line in lines.iter().take(height) {
            self.line(format_args!("   | {}", line));
        }
        if lines.len() > height {
            self.line(format_args!("   | … {} more line(s)", lines.len() - height));
        }
    }
}

/// One section's content box, sized in rows.
struct ContentArea {
    rows: u32,
    height: u32,
    selection: Option<Selection>,
}

impl GrowableField for ContentArea {
    fn natural_height(&self) -> u32 {
        self.rows
    }

    fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }
}

impl<W: Write> EditorSurface for TerminalPresenter<W> {
    fn scroll_offset(&self) -> u32 {
        self.scroll
    }

    fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll = offset;
    }

    fn focused_field(&self) -> Option<FieldRef> {
        self.focused
    }

    fn selection(&self, field: FieldRef) -> Option<Selection> {
        self.selections.get(&field).copied()
    }

    fn content_len(&self, field: FieldRef) -> Option<usize> {
        self.fields.get(&field).map(|s| s.chars().count())
    }

    fn focus(&mut self, field: FieldRef) -> bool {
        if !self.fields.contains_key(&field) {
            return false;
        }
        self.focused = Some(field);
        true
    }

    fn set_selection(&mut self, field: FieldRef, selection: Selection) {
        self.selections.insert(field, selection);
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, note: &Note, ctx: &RenderContext) {
        if ctx.kind.needs_restore() {
            self.rebuild_fields(note);
        } else {
            self.sync_fields(note);
        }
        self.print_note(note, ctx);
    }

    fn render_list(&mut self, notes: &[&Note], search_term: &str) {
        if notes.is_empty() {
            self.line(format_args!("No notes found."));
            return;
        }
        if search_term.is_empty() {
            self.line(format_args!("Notes:"));
        } else {
            self.line(format_args!("Notes matching '{}':", search_term));
        }
        for note in notes {
            self.line(format_args!("  {}  {}", note, note.preview(60)));
        }
    }

    fn report_error(&mut self, error: EditorError) {
        warn!(error = %error, "editor error");
        self.line(format_args!("error: {}", error));
    }
}
