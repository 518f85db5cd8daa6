//! JSON file backend with atomic writes.

use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use super::kv::{KeyValueStore, StoreError, scoped_key};

/// Stores each key as `<dir>/<namespace>_<key>.json`.
///
/// Writes go to a temporary file in the same directory that is then renamed
/// over the target, so a crash mid-save never leaves a truncated file.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    namespace: String,
}

impl JsonFileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path, namespace: impl Into<String>) -> Result<Self, StoreError> {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| StoreError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            namespace: namespace.into(),
        })
    }

    /// Returns the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", scoped_key(&self.namespace, key)))
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io { path, source: e }),
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                source: e,
            })
    }

    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let content = serde_json::to_string_pretty(value).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            source: e,
        })?;

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::Io {
            path: path.clone(),
            source: e,
        })?;
        temp.write_all(content.as_bytes())
            .map_err(|e| StoreError::Io {
                path: path.clone(),
                source: e,
            })?;
        temp.persist(&path).map_err(|e| StoreError::AtomicWrite {
            path: path.clone(),
            source: e.error,
        })?;

        debug!(path = %path.display(), bytes = content.len(), "saved");
        Ok(())
    }

    fn set_aside(&mut self, key: &str, suffix: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key);
        let mut aside = path.clone().into_os_string();
        aside.push(format!(".{suffix}"));
        let aside = PathBuf::from(aside);
        match fs::rename(&path, &aside) {
            Ok(()) => {
                debug!(from = %path.display(), to = %aside.display(), "set aside");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }
}
