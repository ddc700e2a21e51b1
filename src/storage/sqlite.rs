//! SQLite storage implementation

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use super::schema;
use crate::{Error, Result};

/// A single cached mapping from a content key to a resolved file identifier.
///
/// `file_id` is opaque: whatever the external resolution system handed back.
/// `created_at` is set when the row is written and refreshed on overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub file_id: String,
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed store for the key -> file-identifier table
#[derive(Debug)]
pub struct FileIdStore {
    conn: Connection,
}

impl FileIdStore {
    /// Open a database file (creates if doesn't exist).
    ///
    /// Idempotent across process starts: the schema is created if absent and
    /// left untouched otherwise. Fails with [`Error::StorageInit`] when the
    /// path is unwritable or an existing `file_ids` table has an
    /// incompatible shape.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| Error::StorageInit {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store
            .apply_pragmas()
            .and_then(|_| store.initialize_schema())
            .map_err(|source| Error::StorageInit {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.apply_pragmas()?;
        store.initialize_schema()?;
        Ok(store)
    }

    /// WAL keeps readers off the writer's lock; the busy timeout serializes
    /// the occasional concurrent writer instead of failing immediately.
    fn apply_pragmas(&self) -> rusqlite::Result<()> {
        // journal_mode returns the resulting mode as a row
        let _mode: String = self
            .conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        self.conn.pragma_update(None, "busy_timeout", 5000)?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(())
    }

    /// Initialize the database schema and verify an existing table is usable
    fn initialize_schema(&self) -> rusqlite::Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        self.conn.prepare(schema::VERIFY_COLUMNS)?;
        Ok(())
    }

    /// Get the cached entry for a key, or `None` if the key was never cached.
    ///
    /// A missing key is not an error; only an I/O failure is.
    pub fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        self.conn
            .query_row(
                "SELECT key, file_id, created_at FROM file_ids WHERE key = ?1",
                [key],
                Self::row_to_entry,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Insert or overwrite the entry for a key (last-write-wins).
    ///
    /// An existing key has its `file_id` replaced and `created_at` refreshed;
    /// the cache holds the latest known-good identifier, not a history. The
    /// row is committed atomically, so a concurrent `get` sees either the
    /// old complete entry or the new one.
    pub fn put(&self, key: &str, file_id: &str) -> Result<CacheEntry> {
        let entry = CacheEntry {
            key: key.to_string(),
            file_id: file_id.to_string(),
            created_at: Utc::now(),
        };
        self.conn.execute(
            r#"
            INSERT INTO file_ids (key, file_id, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                file_id = excluded.file_id,
                created_at = excluded.created_at
            "#,
            params![entry.key, entry.file_id, entry.created_at],
        )?;
        Ok(entry)
    }

    /// Remove the entry for a key. Returns whether an entry existed.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM file_ids WHERE key = ?1", [key])?;
        Ok(removed > 0)
    }

    /// Count all cached entries
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM file_ids", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get store statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let (oldest, newest) = self.conn.query_row(
            "SELECT MIN(created_at), MAX(created_at) FROM file_ids",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(StoreStats {
            entries: self.count()?,
            oldest,
            newest,
        })
    }

    /// Release the underlying connection.
    ///
    /// The owning process is expected to call this on every exit path,
    /// including termination signals, so no partial write stays visible.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_conn, err)| Error::Storage(err))
    }

    /// Helper to convert a row to a CacheEntry
    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<CacheEntry> {
        Ok(CacheEntry {
            key: row.get(0)?,
            file_id: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub entries: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cache Statistics:")?;
        writeln!(f, "  Entries: {}", self.entries)?;
        match (&self.oldest, &self.newest) {
            (Some(oldest), Some(newest)) => {
                writeln!(f, "  Oldest: {}", oldest)?;
                write!(f, "  Newest: {}", newest)
            }
            _ => write!(f, "  (empty)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get_roundtrip() {
        let store = FileIdStore::open_in_memory().unwrap();

        store.put("hash:abc123", "tg:FILE_789").unwrap();

        let entry = store.get("hash:abc123").unwrap().unwrap();
        assert_eq!(entry.key, "hash:abc123");
        assert_eq!(entry.file_id, "tg:FILE_789");
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let store = FileIdStore::open_in_memory().unwrap();

        assert!(store.get("hash:unknown").unwrap().is_none());
    }

    #[test]
    fn test_overwrite_is_last_write_wins() {
        let store = FileIdStore::open_in_memory().unwrap();

        let first = store.put("slug", "file-a").unwrap();
        let second = store.put("slug", "file-b").unwrap();

        let entry = store.get("slug").unwrap().unwrap();
        assert_eq!(entry.file_id, "file-b");
        assert_eq!(entry.created_at, second.created_at);
        assert!(entry.created_at >= first.created_at);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_put_returns_stored_entry() {
        let store = FileIdStore::open_in_memory().unwrap();

        let returned = store.put("k", "v").unwrap();
        let fetched = store.get("k").unwrap().unwrap();
        assert_eq!(returned, fetched);
    }

    #[test]
    fn test_delete_removes_entry() {
        let store = FileIdStore::open_in_memory().unwrap();

        store.put("k", "v").unwrap();
        assert!(store.delete("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
        assert!(!store.delete("k").unwrap());
    }

    #[test]
    fn test_reopen_preserves_entries() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cache.db");

        let store = FileIdStore::open(&db_path).unwrap();
        store.put("hash:abc123", "tg:FILE_789").unwrap();
        store.close().unwrap();

        // Simulated process restart: open against the same path
        let store = FileIdStore::open(&db_path).unwrap();
        let entry = store.get("hash:abc123").unwrap().unwrap();
        assert_eq!(entry.file_id, "tg:FILE_789");
    }

    #[test]
    fn test_incompatible_table_fails_init() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("cache.db");

        let conn = Connection::open(&db_path).unwrap();
        conn.execute("CREATE TABLE file_ids (key TEXT PRIMARY KEY)", [])
            .unwrap();
        conn.close().unwrap();

        let err = FileIdStore::open(&db_path).unwrap_err();
        assert!(matches!(err, Error::StorageInit { .. }));
    }

    #[test]
    fn test_stats() {
        let store = FileIdStore::open_in_memory().unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.entries, 0);
        assert!(stats.oldest.is_none());

        store.put("a", "1").unwrap();
        store.put("b", "2").unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.entries, 2);
        assert!(stats.oldest.unwrap() <= stats.newest.unwrap());
    }
}
