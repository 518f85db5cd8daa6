//! SQLite key-value backend.

use std::fs;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

use super::kv::{KeyValueStore, StoreError, scoped_key};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
";

/// Stores values as JSON text in a single `kv` table.
pub struct SqliteStore {
    conn: Connection,
    namespace: String,
}

impl SqliteStore {
    /// Opens an in-memory database; nothing survives the process.
    pub fn open_in_memory(namespace: impl Into<String>) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            namespace: namespace.into(),
        })
    }

    /// Opens or creates a database file, creating parent directories if needed.
    pub fn open(path: &Path, namespace: impl Into<String>) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            namespace: namespace.into(),
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![scoped_key(&self.namespace, key)],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|text| {
            serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                source: e,
            })
        })
        .transpose()
    }

    fn save(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![scoped_key(&self.namespace, key), value.to_string()],
        )?;
        Ok(())
    }

    fn set_aside(&mut self, key: &str, suffix: &str) -> Result<bool, StoreError> {
        let changed = self.conn.execute(
            "UPDATE kv SET key = ?2 WHERE key = ?1",
            params![
                scoped_key(&self.namespace, key),
                scoped_key(&self.namespace, &format!("{key}.{suffix}"))
            ],
        )?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn in_memory_round_trip() {
        let mut store = SqliteStore::open_in_memory("app").unwrap();
        assert_eq!(store.load("notes").unwrap(), None);
        store.save("notes", &json!({"a": 1})).unwrap();
        store.save("notes", &json!({"a": 2})).unwrap();
        assert_eq!(store.load("notes").unwrap(), Some(json!({"a": 2})));
    }

    #[test]
    fn keys_are_namespaced() {
        let mut store = SqliteStore::open_in_memory("app").unwrap();
        store.save("notes", &json!(1)).unwrap();
        let stored: String = store
            .conn
            .query_row("SELECT key FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, "app_notes");
    }

    #[test]
    fn file_database_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("notes.db");
        {
            let mut store = SqliteStore::open(&path, "app").unwrap();
            store.save("notes", &json!([1, 2, 3])).unwrap();
        }
        let store = SqliteStore::open(&path, "app").unwrap();
        assert_eq!(store.load("notes").unwrap(), Some(json!([1, 2, 3])));
    }

    #[test]
    fn corrupt_row_is_reported() {
        let store = SqliteStore::open_in_memory("app").unwrap();
        store
            .conn
            .execute(
                "INSERT INTO kv (key, value) VALUES ('app_notes', '{oops')",
                [],
            )
            .unwrap();
        assert!(matches!(
            store.load("notes"),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn set_aside_keeps_the_raw_row() {
        let mut store = SqliteStore::open_in_memory("app").unwrap();
        store
            .conn
            .execute(
                "INSERT INTO kv (key, value) VALUES ('app_notes', '{oops')",
                [],
            )
            .unwrap();

        assert!(store.set_aside("notes", "corrupt-1").unwrap());
        assert_eq!(store.load("notes").unwrap(), None);
        let kept: String = store
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = 'app_notes.corrupt-1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(kept, "{oops");
        assert!(!store.set_aside("notes", "corrupt-2").unwrap());
    }
}
