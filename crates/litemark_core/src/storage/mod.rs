//! Local key-value storage substrate.
//!
//! # Responsibility
//! - Define the string-keyed store contract the note collections live in.
//! - Provide a SQLite-backed store for real use and an in-memory store for
//!   tests and ephemeral sessions.
//!
//! # Invariants
//! - `set` is a full overwrite of one key; there is no partial update.
//! - No atomicity is offered across keys.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by a key-value backend.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// The write would exceed the backend's size limit.
    QuotaExceeded {
        key: String,
        requested_bytes: usize,
        quota_bytes: usize,
    },
    /// Backend schema is missing a required table.
    MissingRequiredTable(&'static str),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded {
                key,
                requested_bytes,
                quota_bytes,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {requested_bytes} bytes requested, {quota_bytes} allowed"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "storage schema is missing table `{table}`")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// String-keyed persistent store, shaped after browser local storage.
pub trait KeyValueStore {
    /// Returns the stored value, or `None` when the key was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Overwrites the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
}
