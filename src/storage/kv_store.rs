use std::collections::HashMap;
use std::path::Path;

use rusqlite::{OptionalExtension, params};

use super::database::Database;
use crate::common::PersistenceError;

/// String key-value persistence used to survive process restarts.
///
/// `multi_set` and `remove` are all-or-nothing: either every entry is
/// written (or removed) or the store is left as it was.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.multi_set(&[(key, value.to_string())])
    }

    fn multi_set(&mut self, entries: &[(&str, String)]) -> Result<(), PersistenceError>;

    /// Removing keys that are not present succeeds.
    fn remove(&mut self, keys: &[&str]) -> Result<(), PersistenceError>;
}

/// SQLite-backed store (single `kv_store` table).
pub struct SqliteKeyValueStore {
    db: Database,
}

impl SqliteKeyValueStore {
    pub fn with_path<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        Self::from_database(Database::open(path)?)
    }

    pub fn in_memory() -> Result<Self, PersistenceError> {
        Self::from_database(Database::in_memory()?)
    }

    fn from_database(db: Database) -> Result<Self, PersistenceError> {
        db.connection().execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { db })
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let value = self
            .db
            .connection()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn multi_set(&mut self, entries: &[(&str, String)]) -> Result<(), PersistenceError> {
        let tx = self.db.connection_mut().transaction()?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&mut self, keys: &[&str]) -> Result<(), PersistenceError> {
        let tx = self.db.connection_mut().transaction()?;
        for key in keys {
            tx.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn multi_set(&mut self, entries: &[(&str, String)]) -> Result<(), PersistenceError> {
        for (key, value) in entries {
            self.entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove(&mut self, keys: &[&str]) -> Result<(), PersistenceError> {
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_store_round_trips_and_overwrites() {
        let mut store = SqliteKeyValueStore::in_memory().unwrap();
        assert_eq!(store.get("token").unwrap(), None);

        store.set("token", "t1").unwrap();
        store.set("token", "t2").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("t2"));
    }

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.db");

        {
            let mut store = SqliteKeyValueStore::with_path(&path).unwrap();
            store
                .multi_set(&[("user", "{}".to_string()), ("token", "t1".to_string())])
                .unwrap();
        }

        let store = SqliteKeyValueStore::with_path(&path).unwrap();
        assert_eq!(store.get("user").unwrap().as_deref(), Some("{}"));
        assert_eq!(store.get("token").unwrap().as_deref(), Some("t1"));
    }

    #[test]
    fn removing_missing_keys_is_fine() {
        let mut store = SqliteKeyValueStore::in_memory().unwrap();
        store.set("a", "1").unwrap();
        store.remove(&["a", "missing"]).unwrap();
        assert_eq!(store.get("a").unwrap(), None);

        let mut memory = MemoryKeyValueStore::new();
        memory.remove(&["missing"]).unwrap();
        assert!(memory.is_empty());
    }
}
