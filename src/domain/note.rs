//! Note and Section types representing a titled note made of collapsible sections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a note, unique within the note collection.
pub type NoteId = i64;

/// Identifier of a section, unique within its note.
pub type SectionId = i64;

/// Number of sections a freshly created note starts with.
pub const DEFAULT_SECTION_COUNT: usize = 3;

/// A collapsible block of text inside a note (a "toggle").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    id: SectionId,
    title: String,
    content: String,
    is_open: bool,
}

impl Section {
    /// Creates a section with the given fields.
    pub fn new(
        id: SectionId,
        title: impl Into<String>,
        content: impl Into<String>,
        is_open: bool,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            is_open,
        }
    }

    /// Returns the section's identifier.
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Returns the section's title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the section's text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns true if the section is expanded.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Flips the open state and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.is_open = !self.is_open;
        self.is_open
    }

    fn snapshot(&self) -> Self {
        Self {
            id: self.id,
            title: self.title.as_str().to_owned(),
            content: self.content.as_str().to_owned(),
            is_open: self.is_open,
        }
    }
}

/// A note: a title plus an ordered list of sections.
///
/// Equality is structural. Two notes with identical content compare equal
/// regardless of where they came from, which is what the history relies on
/// to collapse no-op edits.
///
/// # Examples
///
/// ```
/// use togglenote::domain::Note;
/// use chrono::Utc;
///
/// let note = Note::new_default(1_700_000_000_000, Utc::now());
/// assert_eq!(note.sections().len(), 3);
/// assert!(note.sections()[0].is_open());
/// assert!(!note.sections()[1].is_open());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    id: NoteId,
    title: String,
    sections: Vec<Section>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates an empty note with no sections.
    pub fn new(id: NoteId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::from_parts(id, title, Vec::new(), now, now)
    }

    /// Creates a note the way the "new note" action does: an empty title and
    /// three sections, only the first one open.
    pub fn new_default(id: NoteId, now: DateTime<Utc>) -> Self {
        let sections = (0..DEFAULT_SECTION_COUNT)
            .map(|i| Section::new(id + i as i64, format!("Section {}", i + 1), "", i == 0))
            .collect();
        Self::from_parts(id, "", sections, now, now)
    }

    /// Assembles a note from all of its fields.
    ///
    /// No invariants are checked here; see [`crate::domain::validate_note`].
    pub fn from_parts(
        id: NoteId,
        title: impl Into<String>,
        sections: Vec<Section>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            sections,
            created_at,
            updated_at,
        }
    }

    /// Returns the note's identifier.
    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Returns the note's title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the note's sections in display order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns when the note was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the note was last written to storage.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the section with the given id, if any.
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Returns a mutable reference to the section with the given id, if any.
    pub fn section_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }

    /// Appends a new open section titled `Section N`, N being the new count.
    ///
    /// The id is `candidate` unless that would collide with or precede an
    /// existing id, in which case it is one past the current maximum.
    pub fn append_section(&mut self, candidate: SectionId) -> SectionId {
        let id = match self.sections.iter().map(|s| s.id).max() {
            Some(max) if candidate <= max => max + 1,
            _ => candidate,
        };
        let title = format!("Section {}", self.sections.len() + 1);
        self.sections.push(Section::new(id, title, "", true));
        id
    }

    /// Returns an independent structural copy of this note.
    ///
    /// Every string is copied field by field; nothing is shared with `self`,
    /// and no serialization is involved so timestamps keep full precision.
    pub fn snapshot(&self) -> Self {
        Self {
            id: self.id,
            title: self.title.as_str().to_owned(),
            sections: self.sections.iter().map(Section::snapshot).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Returns true if the title or any section title or content contains
    /// `term`, ignoring case. An empty term matches everything.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&term)
            || self.sections.iter().any(|s| {
                s.title.to_lowercase().contains(&term) || s.content.to_lowercase().contains(&term)
            })
    }

    /// Returns a short preview of the note body for list views.
    pub fn preview(&self, max_chars: usize) -> String {
        let joined = self
            .sections
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let joined = joined.trim();
        if joined.is_empty() {
            return "No content".to_string();
        }
        if joined.chars().count() > max_chars {
            let cut: String = joined.chars().take(max_chars).collect();
            format!("{cut}...")
        } else {
            joined.to_string()
        }
    }

    /// Returns the title, or a placeholder when the title is empty.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled Note"
        } else {
            &self.title
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.display_title(), self.id)
    }
}
