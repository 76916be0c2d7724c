//! Core domain logic for LiteMark, a local markdown notebook.
//! This crate is the single source of truth for note lifecycle invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod presentation;
pub mod repo;
pub mod service;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::note::{normalize_tag, normalize_tags, Note, NoteId, TagError, TAG_MARKER};
pub use presentation::{
    filter_notes, summarize, tag_index, trash_listing, NoteListView, NoteSummary, TagBrowser,
    TagCount,
};
pub use repo::note_repo::{
    NoteCollection, NoteRepository, RepoError, RepoResult, ACTIVE_NOTES_KEY, DELETED_NOTES_KEY,
};
pub use service::note_service::{
    NoteCounter, NotePatch, NoteService, NoteServiceError, NoteServiceResult, UpdateOutcome,
};
pub use session::{
    EditingSession, ExportDocument, MarkdownSnippet, Selection, SessionConfig, TagEntry, TagKey,
};
pub use storage::{KeyValueStore, MemoryKvStore, SqliteKvStore, StorageError, StorageResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
