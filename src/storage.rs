//! Key/value persistence backends.
//!
//! A collection is stored as one JSON array under one string key. The
//! backends here only move opaque strings; decoding and validation happen in
//! [`crate::store`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::db;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("quota exceeded writing {key}: {needed} bytes, limit {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Minimal surface of a browser-style local storage area.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(workspace: &Path, file_name: &str) -> anyhow::Result<Self> {
        let conn = db::open_db(workspace, file_name)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::open_in_memory()?),
        })
    }

    fn with_conn<R>(
        &self,
        f: impl FnOnce(&Connection) -> Result<R, StorageError>,
    ) -> Result<R, StorageError> {
        let guard = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        f(&guard)
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT value FROM kv_items WHERE key = ?",
                    [key],
                    |row| row.get(0),
                )
                .optional()?)
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = chrono::Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_items(key, value, updated_at) VALUES(?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )?;
            Ok(())
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv_items WHERE key = ?", [key])?;
            Ok(())
        })
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM kv_items ORDER BY key")?;
            let keys = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(keys)
        })
    }
}

/// In-process backend. Used when no workspace is selected and in tests,
/// where its switches simulate a disabled or full storage area.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    reads_disabled: AtomicBool,
    writes_disabled: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total size of all stored values may not exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota_bytes: Some(bytes),
            ..Self::default()
        }
    }

    pub fn set_reads_disabled(&self, disabled: bool) {
        self.reads_disabled.store(disabled, Ordering::SeqCst);
    }

    pub fn set_writes_disabled(&self, disabled: bool) {
        self.writes_disabled.store(disabled, Ordering::SeqCst);
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.reads_disabled.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.writes_disabled.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        if let Some(limit) = self.quota_bytes {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if self.writes_disabled.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        let mut items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let items = self.items.lock().map_err(|_| StorageError::Poisoned)?;
        let mut keys: Vec<String> = items.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(prefix: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let p = std::env::temp_dir().join(format!("{prefix}-{nanos}"));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn sqlite_storage_survives_reopen() {
        let dir = temp_dir("prepd-sqlite-kv");
        {
            let storage = SqliteStorage::open(&dir, "prepd.sqlite3").expect("open");
            storage.set_item("prepd.modules", "[]").expect("set");
            storage.set_item("prepd.modules", "[1]").expect("overwrite");
        }
        let storage = SqliteStorage::open(&dir, "prepd.sqlite3").expect("reopen");
        assert_eq!(
            storage.get_item("prepd.modules").expect("get"),
            Some("[1]".to_string())
        );
        assert_eq!(storage.keys().expect("keys"), vec!["prepd.modules"]);

        storage.remove_item("prepd.modules").expect("remove");
        assert_eq!(storage.get_item("prepd.modules").expect("get"), None);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn in_memory_sqlite_upserts_and_lists_sorted_keys() {
        let storage = SqliteStorage::open_in_memory().expect("open");
        storage.set_item("prepd.notifications", "[]").expect("set");
        storage.set_item("prepd.badges", "[]").expect("set");
        storage.set_item("prepd.badges", "[{}]").expect("upsert");
        assert_eq!(
            storage.keys().expect("keys"),
            vec!["prepd.badges", "prepd.notifications"]
        );
        assert_eq!(
            storage.get_item("prepd.badges").expect("get"),
            Some("[{}]".to_string())
        );
    }

    #[test]
    fn memory_quota_rejects_oversized_writes() {
        let storage = MemoryStorage::with_quota(8);
        storage.set_item("a", "1234").expect("fits");
        let err = storage.set_item("b", "123456").expect_err("over quota");
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 8, .. }));
        // Replacing an existing key only counts the new value.
        storage.set_item("a", "12345678").expect("replace fits");
        assert_eq!(storage.keys().expect("keys"), vec!["a"]);
    }

    #[test]
    fn disabled_memory_storage_reports_unavailable() {
        let storage = MemoryStorage::new();
        storage.set_writes_disabled(true);
        assert!(matches!(
            storage.set_item("k", "v"),
            Err(StorageError::Unavailable(_))
        ));
        storage.set_reads_disabled(true);
        assert!(matches!(
            storage.get_item("k"),
            Err(StorageError::Unavailable(_))
        ));
    }
}
