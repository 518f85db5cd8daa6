//! Keeping the user's place across re-renders.
//!
//! A re-render that rebuilds input widgets destroys their focus, selection
//! and the scroll position of the surface containing them. Before such a
//! rebuild the presenter's state is captured with [`capture`]; afterwards
//! [`restore`] puts the caret back. Capture has to happen before the old
//! widgets are torn down, so it is done synchronously by
//! [`render_with_reconcile`] rather than left to the presenter.
//!
//! Positions are in whatever units the surface reports (UTF-16 code units
//! for most text widget APIs); this module only compares and clamps them.

use crate::domain::{Note, SectionId};
use crate::history::HistoryStatus;

use super::Presenter;

/// Identifies an editable field within the open note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRef {
    Title,
    SectionTitle(SectionId),
    SectionContent(SectionId),
}

/// A selection range; `start == end` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// Limits both ends to `len`, keeping `start <= end`.
    pub fn clamped(self, len: usize) -> Self {
        let end = self.end.min(len);
        Self {
            start: self.start.min(end),
            end,
        }
    }
}

/// The focused field and its selection at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusState {
    pub field: FieldRef,
    pub selection: Option<Selection>,
}

/// Everything needed to put the user back where they were.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    pub scroll_offset: u32,
    pub focus: Option<FocusState>,
}

/// The focus, selection and scroll API of whatever toolkit shows the note.
pub trait EditorSurface {
    fn scroll_offset(&self) -> u32;
    fn set_scroll_offset(&mut self, offset: u32);

    /// The field that currently has keyboard focus, if it is one of ours.
    fn focused_field(&self) -> Option<FieldRef>;

    /// The selection in `field`, if the toolkit reports one.
    fn selection(&self, field: FieldRef) -> Option<Selection>;

    /// Length of `field`'s content, or `None` if the field is not rendered.
    fn content_len(&self, field: FieldRef) -> Option<usize>;

    /// Gives `field` keyboard focus. Returns false if it could not be found.
    fn focus(&mut self, field: FieldRef) -> bool;

    fn set_selection(&mut self, field: FieldRef, selection: Selection);
}

/// Why the note is being drawn again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    /// Only attributes changed (open/closed state, saved indicator); the
    /// input widgets survive.
    Refresh,
    /// Widgets are discarded and recreated (note opened, section added).
    Rebuild,
    /// The whole note was replaced by undo or redo.
    History,
}

impl RenderKind {
    /// True if this render replaces input widgets, so the view must be
    /// captured before and restored after.
    pub fn needs_restore(self) -> bool {
        matches!(self, RenderKind::Rebuild | RenderKind::History)
    }
}

/// Passed to [`Presenter::render`] alongside the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub kind: RenderKind,
    pub history: HistoryStatus,
}

/// Captures scroll offset and focus. Call before the widgets are rebuilt.
pub fn capture<S: EditorSurface + ?Sized>(surface: &S) -> ViewState {
    let focus = surface.focused_field().map(|field| FocusState {
        field,
        selection: surface.selection(field),
    });
    ViewState {
        scroll_offset: surface.scroll_offset(),
        focus,
    }
}

/// Restores a captured view after a rebuild.
///
/// Returns true if focus was put back. A field that no longer exists (its
/// section was undone away) is skipped. A captured selection is clamped to
/// the new content; with no captured selection the caret goes to the end.
pub fn restore<S: EditorSurface + ?Sized>(surface: &mut S, view: &ViewState) -> bool {
    let refocused = match view.focus {
        Some(focus) => restore_focus(surface, focus),
        None => false,
    };
    // Scroll last: focusing may scroll the surface to the field.
    surface.set_scroll_offset(view.scroll_offset);
    refocused
}

fn restore_focus<S: EditorSurface + ?Sized>(surface: &mut S, focus: FocusState) -> bool {
    let Some(len) = surface.content_len(focus.field) else {
        return false;
    };
    if !surface.focus(focus.field) {
        return false;
    }
    let selection = focus
        .selection
        .map(|s| s.clamped(len))
        .unwrap_or(Selection::caret(len));
    surface.set_selection(focus.field, selection);
    true
}

/// Renders `note`, capturing and restoring the view when the render kind
/// rebuilds widgets.
pub fn render_with_reconcile<P: Presenter + ?Sized>(
    presenter: &mut P,
    note: &Note,
    ctx: &RenderContext,
) {
    let view = ctx.kind.needs_restore().then(|| capture(&*presenter));
    presenter.render(note, ctx);
    if let Some(view) = view {
        restore(presenter, &view);
    }
}

/// A text area that grows with its content.
pub trait GrowableField {
    /// Height the content needs with no constraint.
    fn natural_height(&self) -> u32;
    fn set_height(&mut self, height: u32);
    fn selection(&self) -> Option<Selection>;
    fn set_selection(&mut self, selection: Selection);
}

/// Sizes text areas to their content, up to an optional maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoGrow {
    pub max_height: Option<u32>,
}

impl AutoGrow {
    pub fn new(max_height: Option<u32>) -> Self {
        Self { max_height }
    }

    pub fn height_for(&self, natural: u32) -> u32 {
        match self.max_height {
            Some(max) => natural.min(max),
            None => natural,
        }
    }

    /// Recomputes `field`'s height, putting its selection back if resizing
    /// disturbed it. Returns the new height.
    pub fn fit<F: GrowableField + ?Sized>(&self, field: &mut F) -> u32 {
        let selection = field.selection();
        let height = self.height_for(field.natural_height());
        field.set_height(height);
        if let Some(selection) = selection
            && field.selection() != Some(selection)
        {
            field.set_selection(selection);
        }
        height
    }
}
