//! Note lifecycle service.
//!
//! # Responsibility
//! - Be the single authority over the active and deleted collections.
//! - Provide create/update/soft-delete/restore/purge use-cases.
//! - Seed built-in notes on first run.
//!
//! # Invariants
//! - A note id is never present in both collections after an operation
//!   returns successfully.
//! - `update` bumps `last_modified` only when a field actually changed, and
//!   writes nothing otherwise.
//! - Unknown ids are reported through return values, never as errors.
//! - Soft-delete and restore move the record unchanged; timestamps stay.

use crate::clock::{Clock, SystemClock};
use crate::model::note::{
    generate_note_id, normalize_tag, Note, NoteId, TagError, DEFAULT_NOTE_TITLE,
};
use crate::repo::note_repo::{NoteCollection, NoteRepository, RepoError};
use crate::service::seed::seed_notes;
use crate::storage::KeyValueStore;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Tag value in an update patch is not a valid tag.
    InvalidTag(TagError),
    /// Persistence-layer failure (for example a storage quota).
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTag(err) => write!(f, "invalid tag: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTag(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<TagError> for NoteServiceError {
    fn from(value: TagError) -> Self {
        Self::InvalidTag(value)
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Best-effort hook fired after a note is created.
///
/// Implementations must not block for long; errors are logged and dropped.
pub trait NoteCounter {
    fn increment(&self) -> Result<(), String>;
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NotePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

/// Result of [`NoteService::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// At least one field changed; carries the persisted record.
    Updated(Note),
    /// Every provided field already had that value; nothing was written.
    Unchanged,
    /// No active note has that id.
    NotFound,
}

/// Lifecycle service over a key-value store.
pub struct NoteService<S: KeyValueStore> {
    repo: NoteRepository<S>,
    clock: Box<dyn Clock>,
    counter: Option<Box<dyn NoteCounter>>,
}

impl<S: KeyValueStore> NoteService<S> {
    /// Creates a service reading time from the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Box::new(SystemClock))
    }

    /// Creates a service with an explicit time source.
    pub fn with_clock(store: S, clock: Box<dyn Clock>) -> Self {
        Self {
            repo: NoteRepository::new(store),
            clock,
            counter: None,
        }
    }

    /// Installs the creation counter hook.
    pub fn set_counter(&mut self, counter: Box<dyn NoteCounter>) {
        self.counter = Some(counter);
    }

    /// Seeds built-in notes when both collections are empty.
    ///
    /// Returns whether seeding happened. Safe to call on every startup.
    pub fn initialize(&mut self) -> NoteServiceResult<bool> {
        let active = self.repo.load(NoteCollection::Active);
        let deleted = self.repo.load(NoteCollection::Deleted);
        if !active.is_empty() || !deleted.is_empty() {
            debug!(
                "event=store_init module=store status=skipped active={} deleted={}",
                active.len(),
                deleted.len()
            );
            return Ok(false);
        }

        let seeds = seed_notes(self.clock.now());
        self.repo.save(NoteCollection::Active, &seeds)?;
        info!(
            "event=store_init module=store status=ok seeded={}",
            seeds.len()
        );
        Ok(true)
    }

    /// Snapshot of the active collection in stored order.
    pub fn list_active(&self) -> Vec<Note> {
        self.repo.load(NoteCollection::Active)
    }

    /// Snapshot of the deleted collection in stored order.
    pub fn list_deleted(&self) -> Vec<Note> {
        self.repo.load(NoteCollection::Deleted)
    }

    /// Looks up one active note.
    pub fn get_active(&self, id: &str) -> Option<Note> {
        self.list_active().into_iter().find(|note| note.id == id)
    }

    /// Creates an empty note with the default title and appends it to the
    /// active collection.
    pub fn create(&mut self) -> NoteServiceResult<Note> {
        let mut active = self.repo.load(NoteCollection::Active);
        let deleted = self.repo.load(NoteCollection::Deleted);
        let id = allocate_id(&active, &deleted);
        let note = Note::with_id(id, DEFAULT_NOTE_TITLE, "", self.clock.now());

        active.push(note.clone());
        self.repo.save(NoteCollection::Active, &active)?;
        info!(
            "event=note_create module=store status=ok note_id={}",
            note.id
        );

        self.bump_counter();
        Ok(note)
    }

    /// Applies `patch` to an active note.
    ///
    /// Tags already stored on the note are kept verbatim; only tags the patch
    /// introduces are validated.
    ///
    /// # Errors
    /// - [`NoteServiceError::InvalidTag`] when a newly added tag is invalid.
    /// - [`NoteServiceError::Repo`] when the write fails.
    pub fn update(&mut self, id: &str, patch: NotePatch) -> NoteServiceResult<UpdateOutcome> {
        let mut active = self.repo.load(NoteCollection::Active);
        let Some(note) = active.iter_mut().find(|note| note.id == id) else {
            debug!("event=note_update module=store status=not_found note_id={id}");
            return Ok(UpdateOutcome::NotFound);
        };
        let tags = patch
            .tags
            .as_deref()
            .map(|requested| merge_tags(&note.tags, requested))
            .transpose()?;

        let mut changed = false;
        if let Some(title) = patch.title {
            changed |= replace_if_different(&mut note.title, title);
        }
        if let Some(content) = patch.content {
            changed |= replace_if_different(&mut note.content, content);
        }
        if let Some(tags) = tags {
            changed |= replace_if_different(&mut note.tags, tags);
        }

        if !changed {
            debug!("event=note_update module=store status=unchanged note_id={id}");
            return Ok(UpdateOutcome::Unchanged);
        }

        note.last_modified = self.clock.now();
        let updated = note.clone();
        self.repo.save(NoteCollection::Active, &active)?;
        info!("event=note_update module=store status=ok note_id={id}");
        Ok(UpdateOutcome::Updated(updated))
    }

    /// Moves an active note to the trash.
    ///
    /// Returns `false` when no active note has that id. Writes the deleted
    /// collection first, then the active one.
    pub fn soft_delete(&mut self, id: &str) -> NoteServiceResult<bool> {
        let moved = self.relocate(id, NoteCollection::Active, NoteCollection::Deleted)?;
        if moved {
            info!("event=note_soft_delete module=store status=ok note_id={id}");
        }
        Ok(moved)
    }

    /// Moves a trashed note back to the active collection.
    pub fn restore(&mut self, id: &str) -> NoteServiceResult<bool> {
        let moved = self.relocate(id, NoteCollection::Deleted, NoteCollection::Active)?;
        if moved {
            info!("event=note_restore module=store status=ok note_id={id}");
        }
        Ok(moved)
    }

    /// Permanently removes one trashed note.
    pub fn purge(&mut self, id: &str) -> NoteServiceResult<bool> {
        let mut deleted = self.repo.load(NoteCollection::Deleted);
        let before = deleted.len();
        deleted.retain(|note| note.id != id);
        if deleted.len() == before {
            debug!("event=note_purge module=store status=not_found note_id={id}");
            return Ok(false);
        }

        self.repo.save(NoteCollection::Deleted, &deleted)?;
        info!("event=note_purge module=store status=ok note_id={id}");
        Ok(true)
    }

    /// Empties the trash and returns how many notes were removed.
    pub fn purge_all(&mut self) -> NoteServiceResult<usize> {
        let count = self.repo.load(NoteCollection::Deleted).len();
        self.repo.save(NoteCollection::Deleted, &[])?;
        info!("event=trash_clear module=store status=ok purged={count}");
        Ok(count)
    }

    /// Borrows the underlying key-value store.
    pub fn store(&self) -> &S {
        self.repo.store()
    }

    fn relocate(
        &mut self,
        id: &str,
        from: NoteCollection,
        to: NoteCollection,
    ) -> NoteServiceResult<bool> {
        let mut source = self.repo.load(from);
        let Some(position) = source.iter().position(|note| note.id == id) else {
            debug!(
                "event=note_move module=store status=not_found note_id={id} from={}",
                from.storage_key()
            );
            return Ok(false);
        };
        let note = source.remove(position);

        let mut target = self.repo.load(to);
        target.retain(|existing| existing.id != note.id);
        target.push(note);

        self.repo.save(to, &target)?;
        self.repo.save(from, &source)?;
        Ok(true)
    }

    fn bump_counter(&self) {
        let Some(counter) = self.counter.as_ref() else {
            return;
        };
        if let Err(err) = counter.increment() {
            warn!("event=note_counter module=store status=error error={err}");
        }
    }
}

/// Keeps stored tags as they are, normalizes new ones and drops later
/// duplicates.
fn merge_tags(stored: &[String], requested: &[String]) -> Result<Vec<String>, TagError> {
    let mut merged: Vec<String> = Vec::with_capacity(requested.len());
    for raw in requested {
        let tag = if stored.contains(raw) {
            raw.clone()
        } else {
            normalize_tag(raw)?
        };
        if !merged.contains(&tag) {
            merged.push(tag);
        }
    }
    Ok(merged)
}

fn replace_if_different<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn allocate_id(active: &[Note], deleted: &[Note]) -> NoteId {
    loop {
        let candidate = generate_note_id();
        let taken = active
            .iter()
            .chain(deleted.iter())
            .any(|note| note.id == candidate);
        if !taken {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{merge_tags, replace_if_different, NotePatch};
    use crate::model::note::TagError;

    #[test]
    fn replace_if_different_reports_change() {
        let mut value = "a".to_string();
        assert!(!replace_if_different(&mut value, "a".to_string()));
        assert!(replace_if_different(&mut value, "b".to_string()));
        assert_eq!(value, "b");
    }

    #[test]
    fn merge_tags_keeps_stored_tags_and_checks_new_ones() {
        let stored = vec!["work".to_string()];
        let requested = vec!["work".to_string(), " #home ".to_string(), "#home".to_string()];
        assert_eq!(
            merge_tags(&stored, &requested).unwrap(),
            vec!["work".to_string(), "#home".to_string()]
        );
        assert_eq!(
            merge_tags(&stored, &["play".to_string()]),
            Err(TagError::MissingMarker("play".to_string()))
        );
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(NotePatch::new().is_empty());
        assert!(!NotePatch::new().content("x").is_empty());
    }
}
