//! Note collection persistence adapter.
//!
//! # Responsibility
//! - Map the active/deleted collections onto their storage keys.
//! - Serialize whole collections as JSON arrays.
//!
//! # Invariants
//! - `load` never fails: absent keys, read errors and corrupt payloads all
//!   yield an empty collection.
//! - `save` is an unconditional full overwrite of one collection.
//! - Moving a note between collections is two independent writes; a crash
//!   in between can leave it in both or in neither.

use crate::model::note::Note;
use crate::storage::{KeyValueStore, StorageError};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key of the active collection.
pub const ACTIVE_NOTES_KEY: &str = "notes";
/// Storage key of the deleted (trash) collection.
pub const DELETED_NOTES_KEY: &str = "deletedNotes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure while saving a collection.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    Serialize(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize notes: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// One of the two persisted note lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteCollection {
    Active,
    Deleted,
}

impl NoteCollection {
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Active => ACTIVE_NOTES_KEY,
            Self::Deleted => DELETED_NOTES_KEY,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

/// Loads and saves note collections over a key-value store.
pub struct NoteRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> NoteRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reads one collection, treating any failure as empty.
    pub fn load(&self, collection: NoteCollection) -> Vec<Note> {
        let raw = match self.store.get(collection.storage_key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(
                    "event=collection_load module=repo status=error collection={} error_code=storage_read_failed error={}",
                    collection.label(),
                    err
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Note>>(&raw) {
            Ok(notes) => notes,
            Err(err) => {
                warn!(
                    "event=collection_load module=repo status=error collection={} error_code=corrupt_payload bytes={} error={}",
                    collection.label(),
                    raw.len(),
                    err
                );
                Vec::new()
            }
        }
    }

    /// Overwrites one collection with `notes`.
    pub fn save(&mut self, collection: NoteCollection, notes: &[Note]) -> RepoResult<()> {
        let payload = serde_json::to_string(notes)?;
        self.store.set(collection.storage_key(), &payload)?;
        Ok(())
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteCollection, NoteRepository};
    use crate::model::note::Note;
    use crate::storage::{KeyValueStore, MemoryKvStore, StorageError, StorageResult};
    use chrono::{TimeZone, Utc};

    struct UnreadableStore;

    impl KeyValueStore for UnreadableStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::MissingRequiredTable("kv_entries"))
        }

        fn set(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn missing_key_loads_empty() {
        let repo = NoteRepository::new(MemoryKvStore::new());
        assert!(repo.load(NoteCollection::Active).is_empty());
    }

    #[test]
    fn corrupt_payload_loads_empty() {
        let mut store = MemoryKvStore::new();
        store.set("notes", "{not json").unwrap();
        let repo = NoteRepository::new(store);
        assert!(repo.load(NoteCollection::Active).is_empty());
    }

    #[test]
    fn read_failure_loads_empty() {
        let repo = NoteRepository::new(UnreadableStore);
        assert!(repo.load(NoteCollection::Deleted).is_empty());
    }

    #[test]
    fn collections_use_separate_keys() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut repo = NoteRepository::new(MemoryKvStore::new());
        repo.save(NoteCollection::Deleted, &[Note::with_id("d1", "gone", "", ts)])
            .unwrap();

        assert!(repo.load(NoteCollection::Active).is_empty());
        assert_eq!(repo.load(NoteCollection::Deleted)[0].id, "d1");
        assert!(repo.store().raw("deletedNotes").is_some());
        assert!(repo.store().raw("notes").is_none());
    }
}
