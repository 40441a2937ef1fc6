//! Key-value repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Model the browser-local key-value store the local backend writes to.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Keys are unique; `set` overwrites the previous value.
//! - Values are stored verbatim; callers own the encoding.

use super::schema;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::rc::Rc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Key-value persistence error.
#[derive(Debug)]
pub enum RepoError {
    Sqlite(rusqlite::Error),
    /// The store file was written by a newer build.
    UnsupportedLayout { found: u32, supported: u32 },
    /// A stored value exists but cannot be decoded by its owner.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedLayout { found, supported } => write!(
                f,
                "store file layout {found} is newer than supported {supported}"
            ),
            Self::InvalidData(message) => write!(f, "invalid stored value: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedLayout { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String key-value store, the shape of browser `localStorage`.
pub trait KeyValueRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> RepoResult<()>;
}

/// SQLite-backed key-value repository owning its connection.
pub struct SqliteKeyValueRepository {
    conn: Connection,
}

impl SqliteKeyValueRepository {
    /// Opens the store file at `path`, creating it when missing and
    /// upgrading its layout.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self {
            conn: schema::open_file(path.as_ref())?,
        })
    }

    pub fn in_memory() -> RepoResult<Self> {
        Ok(Self {
            conn: schema::open_in_memory()?,
        })
    }
}

impl KeyValueRepository for SqliteKeyValueRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

impl<R: KeyValueRepository + ?Sized> KeyValueRepository for Rc<R> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        (**self).remove(key)
    }
}
