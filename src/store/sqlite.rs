use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{AppError, Result};
use crate::store::KeyValueStore;

const MIGRATION_INITIAL: &str = "CREATE TABLE kv (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// Persistent key-value store backed by SQLite.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(MIGRATION_INITIAL)]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| AppError::Other(format!("Migration failed: {}", e)))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            AppError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("storyType", "new").unwrap();
        assert_eq!(store.get("storyType").unwrap().as_deref(), Some("new"));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("highlight", "1").unwrap();
        store.set("highlight", "2").unwrap();
        assert_eq!(store.get("highlight").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_remove() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("highlight", "1").unwrap();
        store.remove("highlight").unwrap();
        assert_eq!(store.get("highlight").unwrap(), None);
        assert!(store.is_empty().unwrap());

        // Removing a missing key is not an error
        store.remove("highlight").unwrap();
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");

        {
            let store = SqliteStore::new(&path).unwrap();
            store.set("storyType", "ask").unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.get("storyType").unwrap().as_deref(), Some("ask"));
    }
}
