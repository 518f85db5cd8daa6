//! In-memory surface and presenter used by the editor tests.

use std::collections::HashMap;

use crate::domain::Note;

use super::presenter::{EditorError, Presenter};
use super::reconcile::{EditorSurface, FieldRef, RenderContext, RenderKind, Selection};

/// Remembers field contents, focus, selection and scroll like a widget tree.
#[derive(Debug, Default)]
pub(crate) struct FakeSurface {
    pub fields: HashMap<FieldRef, String>,
    pub selections: HashMap<FieldRef, Selection>,
    pub focused: Option<FieldRef>,
    pub scroll: u32,
}

impl FakeSurface {
    pub fn add_field(&mut self, field: FieldRef, content: &str) {
        self.fields.insert(field, content.to_string());
    }

    /// Replaces every widget with fresh ones showing `note`, dropping focus,
    /// selection and scroll the way rebuilt DOM nodes do.
    pub fn rebuild(&mut self, note: &Note) {
        self.fields.clear();
        self.selections.clear();
        self.focused = None;
        self.scroll = 0;
        self.add_field(FieldRef::Title, note.title());
        for section in note.sections() {
            self.add_field(FieldRef::SectionTitle(section.id()), section.title());
            self.add_field(FieldRef::SectionContent(section.id()), section.content());
        }
    }
}

impl EditorSurface for FakeSurface {
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
        if self.fields.contains_key(&field) {
            self.focused = Some(field);
            true
        } else {
            false
        }
    }

    fn set_selection(&mut self, field: FieldRef, selection: Selection) {
        self.selections.insert(field, selection);
    }
}

/// Records every call the session makes on its presenter.
#[derive(Debug, Default)]
pub(crate) struct RecordingPresenter {
    pub surface: FakeSurface,
    pub renders: Vec<(RenderKind, Note)>,
    pub contexts: Vec<RenderContext>,
    pub lists: Vec<(Vec<i64>, String)>,
    pub errors: Vec<EditorError>,
}

impl RecordingPresenter {
    pub fn last_kind(&self) -> Option<RenderKind> {
        self.renders.last().map(|(kind, _)| *kind)
    }
}

impl EditorSurface for RecordingPresenter {
    fn scroll_offset(&self) -> u32 {
        self.surface.scroll_offset()
    }

    fn set_scroll_offset(&mut self, offset: u32) {
        self.surface.set_scroll_offset(offset);
    }

    fn focused_field(&self) -> Option<FieldRef> {
        self.surface.focused_field()
    }

    fn selection(&self, field: FieldRef) -> Option<Selection> {
        self.surface.selection(field)
    }

    fn content_len(&self, field: FieldRef) -> Option<usize> {
        self.surface.content_len(field)
    }

    fn focus(&mut self, field: FieldRef) -> bool {
        self.surface.focus(field)
    }

    fn set_selection(&mut self, field: FieldRef, selection: Selection) {
        self.surface.set_selection(field, selection);
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, note: &Note, ctx: &RenderContext) {
        if ctx.kind.needs_restore() {
            self.surface.rebuild(note);
        }
        self.renders.push((ctx.kind, note.clone()));
        self.contexts.push(*ctx);
    }

    fn render_list(&mut self, notes: &[&Note], search_term: &str) {
        let ids = notes.iter().map(|n| n.id()).collect();
        self.lists.push((ids, search_term.to_string()));
    }

    fn report_error(&mut self, error: EditorError) {
        self.errors.push(error);
    }
}
