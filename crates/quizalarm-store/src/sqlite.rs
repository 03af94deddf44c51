//! SQLite-based store implementation

use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{KeyValueStore, StoreResult};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("Store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let conn = self.conn();

        let raw: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &Value) -> StoreResult<()> {
        let conn = self.conn();
        let json = serde_json::to_string(value)?;

        conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, json, quizalarm_util::now_millis()],
        )?;

        debug!(key, "Value stored");
        Ok(())
    }

    fn has(&self, key: &str) -> StoreResult<bool> {
        let conn = self.conn();

        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()?;

        Ok(found.is_some())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        let conn = self.conn();
        let removed = conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
        Ok(removed > 0)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let conn = self.conn();

        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_get_set_has() {
        let store = SqliteStore::in_memory().unwrap();

        assert!(!store.has("balance").unwrap());
        assert_eq!(store.get("balance").unwrap(), None);

        store.set("balance", &json!(105)).unwrap();
        assert!(store.has("balance").unwrap());
        assert_eq!(store.get("balance").unwrap(), Some(json!(105)));

        store.set("balance", &json!(110)).unwrap();
        assert_eq!(store.get("balance").unwrap(), Some(json!(110)));
    }

    #[test]
    fn test_remove_and_keys() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("history", &json!([])).unwrap();
        store.set("alarms", &json!([{"id": 0}])).unwrap();

        assert_eq!(store.keys().unwrap(), vec!["alarms", "history"]);
        assert!(store.remove("history").unwrap());
        assert!(!store.remove("history").unwrap());
        assert_eq!(store.keys().unwrap(), vec!["alarms"]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quizalarm.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("server_url", &json!("http://localhost:3000")).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get("server_url").unwrap(),
            Some(json!("http://localhost:3000"))
        );
    }
}
