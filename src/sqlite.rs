// SQLite-backed key-value storage

use crate::models::now_ms;
use crate::storage::{KeyValueStorage, StorageError, validate_key};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

/// Key-value storage in a single SQLite table
pub struct SqliteStorage {
    db: Connection,
}

impl SqliteStorage {
    /// Open or create a database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = Connection::open(path.as_ref())?;
        Self::with_connection(db)
    }

    /// Database that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(db: Connection) -> Result<Self, StorageError> {
        let storage = Self { db };
        storage.create_schema()?;
        Ok(storage)
    }

    /// Get a reference to the SQLite database connection
    pub fn db(&self) -> &Connection {
        &self.db
    }

    fn create_schema(&self) -> Result<(), StorageError> {
        debug!("Creating kv schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;

        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;

        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, now_ms()],
        )?;

        debug!(key, bytes = value.len(), "Wrote sqlite storage entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sqlite_get_set() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.get("todos").unwrap(), None);

        storage.set("todos", "[]").unwrap();
        storage.set("todos", "[1,2]").unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("[1,2]"));

        let rows: i64 = storage
            .db()
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_sqlite_persists_across_open() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("todostore.db");

        {
            let mut storage = SqliteStorage::open(&db_path).unwrap();
            storage.set("todos", r#"[{"id":1}]"#).unwrap();
        }

        let storage = SqliteStorage::open(&db_path).unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some(r#"[{"id":1}]"#));
    }

    #[test]
    fn test_sqlite_rejects_invalid_key() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        assert!(matches!(storage.set("", "x"), Err(StorageError::InvalidKey(_))));
    }
}
