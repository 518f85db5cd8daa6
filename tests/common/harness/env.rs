//! Isolated test environment with temp directory.

// Allow dead code since this is a test utility with methods for future tests
#![allow(dead_code)]

use super::{TestNote, TogglenoteCommand};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use togglenote::cli::config::Config;
use togglenote::domain::{Note, NoteId};
use togglenote::store::{KeyValueStore, NoteCollection, NoteRepository};

/// Isolated test environment with a temporary storage directory.
///
/// The binary is pointed at a private config directory, so the user's own
/// config file never leaks into a test. Everything is cleaned up on drop.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    /// Path to the storage directory
    notes_dir: PathBuf,
    /// Directory used as `XDG_CONFIG_HOME`
    config_home: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment with a short autosave delay.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let notes_dir = temp_dir.path().join("notes");
        let config_home = temp_dir.path().join("config");
        std::fs::create_dir_all(&notes_dir).expect("Failed to create notes directory");
        let env = Self {
            _temp_dir: temp_dir,
            notes_dir,
            config_home,
        };
        env.write_config("debounce_ms = 20\n");
        env
    }

    /// Returns the path to the storage directory.
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// Returns the path of the config file the binary will read.
    pub fn config_path(&self) -> PathBuf {
        self.config_home.join("togglenote").join("config.toml")
    }

    /// Replaces the config file contents.
    pub fn write_config(&self, contents: &str) {
        let path = self.config_path();
        std::fs::create_dir_all(path.parent().expect("config path has a parent"))
            .expect("Failed to create config directory");
        std::fs::write(&path, contents).expect("Failed to write config");
    }

    fn config(&self) -> Config {
        Config::load_from(&self.config_path()).expect("Failed to load test config")
    }

    fn open_notes(&self) -> NoteCollection<Box<dyn KeyValueStore>> {
        let store = self
            .config()
            .open_store(&self.notes_dir)
            .expect("Failed to open store");
        NoteCollection::load(store)
    }

    /// Adds a test note through the configured backend and returns its id.
    pub fn add_note(&self, test_note: &TestNote) -> NoteId {
        let mut notes = self.open_notes();
        let now = Utc::now();
        let mut note = notes.create_note(now).expect("Failed to create note");
        note.set_title(test_note.title.as_str());

        let ids: Vec<_> = note.sections().iter().map(|s| s.id()).collect();
        for (n, content) in &test_note.sections {
            let section = note.section_mut(ids[n - 1]).expect("section exists");
            section.set_content(content.as_str());
        }
        for (n, title) in &test_note.section_titles {
            let section = note.section_mut(ids[n - 1]).expect("section exists");
            section.set_title(title.as_str());
        }
        for n in &test_note.open {
            let section = note.section_mut(ids[n - 1]).expect("section exists");
            if !section.is_open() {
                section.toggle();
            }
        }

        notes.update_note(&note, now).expect("Failed to save note");
        note.id()
    }

    /// Reads a note back from storage.
    pub fn note(&self, id: NoteId) -> Option<Note> {
        self.open_notes().find(id).cloned()
    }

    /// Number of notes in storage.
    pub fn note_count(&self) -> usize {
        self.open_notes().notes().len()
    }

    /// Creates a TogglenoteCommand configured for this test environment.
    pub fn cmd(&self) -> TogglenoteCommand {
        TogglenoteCommand::new()
            .dir(&self.notes_dir)
            .env("XDG_CONFIG_HOME", self.config_home.to_string_lossy())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_creates_temp_directory() {
        let env = TestEnv::new();
        assert!(env.notes_dir().is_dir(), "notes directory should exist");
        assert!(env.config_path().is_file(), "config file should exist");
    }

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.notes_dir().to_path_buf()
        };
        assert!(
            !path.exists(),
            "temp directory should be cleaned up on drop"
        );
    }

    #[test]
    fn test_env_add_note_round_trips() {
        let env = TestEnv::new();
        let id = env.add_note(&TestNote::new("Seeded").content(2, "body").open(2));

        let note = env.note(id).expect("note should be stored");
        assert_eq!(note.title(), "Seeded");
        assert_eq!(note.sections()[1].content(), "body");
        assert!(note.sections()[1].is_open());
        assert_eq!(env.note_count(), 1);
    }

    #[test]
    fn test_env_provides_command() {
        let env = TestEnv::new();
        let cmd = env.cmd();
        let args = cmd.get_args();
        assert_eq!(args[0], "--dir");
        assert_eq!(args[1], env.notes_dir().to_string_lossy());
    }
}
