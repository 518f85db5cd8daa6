//! The key-value persistence seam and its in-memory implementation.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Errors raised by a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("atomic write failed for {path}: {source}")]
    AtomicWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("stored value for '{key}' is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A durable string-keyed store of JSON values.
///
/// Keys are logical names such as `notes`; implementations prefix them with
/// their namespace so several apps can share one backend.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` if nothing was saved.
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Moves whatever is stored under `key` to `<key>.<suffix>` as is,
    /// without parsing it. Returns false if nothing was stored.
    fn set_aside(&mut self, key: &str, suffix: &str) -> Result<bool, StoreError>;

    /// Returns the value under `key`, falling back to `default` when it is
    /// missing or unreadable. Read failures are logged.
    fn load_or(&self, key: &str, default: Value) -> Value {
        match self.load(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "storage load failed, using default");
                default
            }
        }
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        (**self).save(key, value)
    }

    fn set_aside(&mut self, key: &str, suffix: &str) -> Result<bool, StoreError> {
        (**self).set_aside(key, suffix)
    }
}

/// Builds the physical key for a logical key.
pub(crate) fn scoped_key(namespace: &str, key: &str) -> String {
    if namespace.is_empty() {
        key.to_string()
    } else {
        format!("{namespace}_{key}")
    }
}

/// A volatile store, mainly for tests and dry runs.
///
/// Saves can be made to fail on demand to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespace: String,
    entries: HashMap<String, Value>,
    fail_saves: bool,
    save_count: usize,
}

impl MemoryStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    /// Physical keys currently stored, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Seeds a raw value, bypassing failure injection.
    pub fn insert_raw(&mut self, key: &str, value: Value) {
        self.entries.insert(scoped_key(&self.namespace, key), value);
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(&scoped_key(&self.namespace, key)).cloned())
    }

    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Unavailable("save rejected".into()));
        }
        self.entries
            .insert(scoped_key(&self.namespace, key), value.clone());
        self.save_count += 1;
        Ok(())
    }

    fn set_aside(&mut self, key: &str, suffix: &str) -> Result<bool, StoreError> {
        if self.fail_saves {
            return Err(StoreError::Unavailable("set aside rejected".into()));
        }
        let Some(value) = self.entries.remove(&scoped_key(&self.namespace, key)) else {
            return Ok(false);
        };
        let aside = scoped_key(&self.namespace, &format!("{key}.{suffix}"));
        self.entries.insert(aside, value);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn scoped_key_prefixes_namespace() {
        assert_eq!(scoped_key("app", "notes"), "app_notes");
        assert_eq!(scoped_key("", "notes"), "notes");
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new("t");
        assert_eq!(store.load("notes").unwrap(), None);
        store.save("notes", &json!([1, 2])).unwrap();
        assert_eq!(store.load("notes").unwrap(), Some(json!([1, 2])));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn memory_store_namespaces_are_isolated() {
        let mut store = MemoryStore::new("a");
        store.save("notes", &json!(1)).unwrap();
        store.insert_raw("other", json!(2));
        assert_eq!(store.entries.get("a_notes"), Some(&json!(1)));
        assert_eq!(store.entries.get("a_other"), Some(&json!(2)));
    }

    #[test]
    fn failing_saves_are_reported() {
        let mut store = MemoryStore::new("t");
        store.set_fail_saves(true);
        let err = store.save("notes", &json!([])).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.load("notes").unwrap(), None);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn load_or_falls_back_to_default() {
        let store = MemoryStore::new("t");
        assert_eq!(store.load_or("notes", json!([])), json!([]));
    }
}
