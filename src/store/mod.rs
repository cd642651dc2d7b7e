//! SQLite inventory storage.
//!
//! Persists every media file ever observed to a single table:
//! - movies: path (primary key), name, found
//!
//! Supports:
//! - Idempotent insertion keyed by path
//! - Listing all recorded (path, name) pairs
//! - Administrative deletion by display name
//!
//! Records are never updated. Every mutating call commits before returning.

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("inventory store at {} is unavailable: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("inventory query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// A single recorded media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub path: PathBuf,
    pub name: String,
    pub first_seen: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(usize),
    NotFound,
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA synchronous = FULL;")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS movies (
            path TEXT PRIMARY KEY,
            name TEXT,
            found TEXT
        )",
        [],
    )?;

    // an existing file with a foreign layout fails here instead of mid-run
    let mut probe = conn.prepare("SELECT path, name, found FROM movies LIMIT 1")?;
    probe.query([])?.next()?;

    Ok(())
}

/// Database handle. Open once per run, reuse across all operations.
pub struct Store {
    conn: Connection,
}

// UTF-8 paths are stored as TEXT. Anything else keeps its raw bytes as a
// BLOB in the same column so distinct paths never collapse into one key.
fn path_to_sql(path: &Path) -> Value {
    match path.to_str() {
        Some(text) => Value::Text(text.to_owned()),
        None => raw_path_to_sql(path),
    }
}

#[cfg(unix)]
fn raw_path_to_sql(path: &Path) -> Value {
    use std::os::unix::ffi::OsStrExt;
    Value::Blob(path.as_os_str().as_bytes().to_vec())
}

#[cfg(not(unix))]
fn raw_path_to_sql(path: &Path) -> Value {
    Value::Text(path.to_string_lossy().into_owned())
}

fn path_from_sql(value: ValueRef<'_>) -> rusqlite::Result<PathBuf> {
    match value {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Ok(path_from_bytes(bytes)),
        other => Err(rusqlite::Error::InvalidColumnType(0, "path".to_string(), other.data_type())),
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

impl Store {
    /// Open the inventory at `path`, creating the file and table if absent.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let unavailable = |source: Box<dyn std::error::Error + Send + Sync>| StoreError::Unavailable {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| unavailable(e.into()))?;
        }

        let existed = path.exists();

        // sqlite silently falls back to read-only when the file is not writable
        if existed {
            std::fs::OpenOptions::new()
                .write(true)
                .open(path)
                .map_err(|e| unavailable(e.into()))?;
        }

        let conn = Connection::open(path).map_err(|e| unavailable(e.into()))?;
        init_schema(&conn).map_err(|e| unavailable(e.into()))?;

        if existed {
            tracing::debug!(path = %path.display(), "opened inventory");
        } else {
            tracing::info!(path = %path.display(), "no inventory existed, created a new one");
        }

        Ok(Store { conn })
    }

    /// Record `path` unless it is already known. A duplicate path is the
    /// normal outcome of re-scanning an unchanged tree, not an error, and the
    /// existing record (including its first-seen time) is left untouched.
    pub fn insert_if_absent(&self, path: &Path, name: &str, found: &str) -> Result<InsertOutcome, StoreError> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO movies (path, name, found) VALUES (?1, ?2, ?3)",
            params![path_to_sql(path), name, found],
        )?;

        Ok(if changed == 0 {
            InsertOutcome::AlreadyPresent
        } else {
            InsertOutcome::Inserted
        })
    }

    /// All recorded (path, name) pairs, ordered by path.
    pub fn list_all(&self) -> Result<Vec<(PathBuf, String)>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT path, name FROM movies ORDER BY path")?;

        let rows = stmt
            .query_map([], |row| {
                let path = path_from_sql(row.get_ref(0)?)?;
                let name: Option<String> = row.get(1)?;
                Ok((path, name.unwrap_or_default()))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// All records with their first-seen timestamps, ordered by path.
    pub fn list_records(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT path, name, found FROM movies ORDER BY path")?;

        let records = stmt
            .query_map([], |row| {
                Ok(InventoryRecord {
                    path: path_from_sql(row.get_ref(0)?)?,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    first_seen: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Remove every record carrying the display name `name`.
    pub fn delete_by_name(&mut self, name: &str) -> Result<DeleteOutcome, StoreError> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM movies WHERE name = ?1", params![name])?;
        tx.commit()?;

        Ok(if deleted == 0 {
            DeleteOutcome::NotFound
        } else {
            DeleteOutcome::Deleted(deleted)
        })
    }
}
