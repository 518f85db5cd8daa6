//! Configuration file support.

use anyhow::{Context, Result};
use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::editor::{DEFAULT_DEBOUNCE_MS, SessionConfig};
use crate::history::DEFAULT_CAPACITY;
use crate::store::{JsonFileStore, KeyValueStore, SqliteStore};

/// Namespace used when the config file doesn't set one.
pub const DEFAULT_NAMESPACE: &str = "togglenote";

/// Where notes are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON file per key
    #[default]
    Json,
    /// A single SQLite database
    Sqlite,
}

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Default storage directory
    pub dir: Option<PathBuf>,

    /// Storage backend
    #[serde(default)]
    pub backend: Backend,

    /// Prefix for every storage key
    pub namespace: Option<String>,

    /// Quiet period before edits are saved, in milliseconds
    pub debounce_ms: Option<u64>,

    /// Maximum undo steps kept per note
    pub history_capacity: Option<usize>,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `config_path`, or defaults if it is missing.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/togglenote/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("togglenote")
            .join("config.toml")
    }

    /// Resolve the storage directory, with CLI argument taking precedence.
    ///
    /// Precedence order:
    /// 1. CLI `--dir` argument
    /// 2. Config file `dir` setting
    /// 3. Current working directory
    pub fn notes_dir(&self, cli_dir: Option<&PathBuf>) -> PathBuf {
        cli_dir
            .cloned()
            .or_else(|| self.dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Debounce and history settings for an edit session.
    pub fn session_config(&self) -> SessionConfig {
        let debounce_ms = self
            .debounce_ms
            .and_then(|ms| i64::try_from(ms).ok())
            .unwrap_or(DEFAULT_DEBOUNCE_MS);
        SessionConfig {
            debounce: Duration::milliseconds(debounce_ms),
            history_capacity: self.history_capacity.unwrap_or(DEFAULT_CAPACITY).max(1),
        }
    }

    /// Opens the configured backend rooted at `notes_dir`.
    pub fn open_store(&self, notes_dir: &Path) -> Result<Box<dyn KeyValueStore>> {
        let namespace = self.namespace().to_string();
        let store: Box<dyn KeyValueStore> = match self.backend {
            Backend::Json => Box::new(
                JsonFileStore::open(notes_dir, namespace)
                    .with_context(|| format!("failed to open store in {}", notes_dir.display()))?,
            ),
            Backend::Sqlite => {
                let db_path = notes_dir.join("togglenote.db");
                Box::new(
                    SqliteStore::open(&db_path, namespace).with_context(|| {
                        format!("failed to open database at {}", db_path.display())
                    })?,
                )
            }
        };
        Ok(store)
    }
}
