//! Builder for test notes with sensible defaults.

#![allow(dead_code)]

/// A note to seed into a test environment.
///
/// Starts as the default new note (three sections, only the first open);
/// the builder methods fill in titles and contents.
#[derive(Debug, Default)]
pub struct TestNote {
    pub(super) title: String,
    pub(super) sections: Vec<(usize, String)>,
    pub(super) section_titles: Vec<(usize, String)>,
    pub(super) open: Vec<usize>,
}

impl TestNote {
    /// Creates a test note with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the content of section `n` (numbered from 1).
    pub fn content(mut self, n: usize, content: impl Into<String>) -> Self {
        self.sections.push((n, content.into()));
        self
    }

    /// Sets the title of section `n` (numbered from 1).
    pub fn section_title(mut self, n: usize, title: impl Into<String>) -> Self {
        self.section_titles.push((n, title.into()));
        self
    }

    /// Opens section `n` (numbered from 1).
    pub fn open(mut self, n: usize) -> Self {
        self.open.push(n);
        self
    }
}
