//! Editing session for the currently open note.
//!
//! # Responsibility
//! - Hold the transient working copy of one note.
//! - Debounce commits back to the note service, keyed by note id.
//! - Provide tag entry, toolbar snippet insertion and markdown export.
//!
//! The session never reads a clock itself: hosts pass `Instant`s in and
//! call [`EditingSession::tick`] from their event loop.

use std::time::Duration;

pub mod debounce;
pub mod editing;
pub mod export;
pub mod snippet;

pub use debounce::Debouncer;
pub use editing::{EditingSession, Selection, TagEntry, TagKey};
pub use export::{sanitize_file_stem, ExportDocument};
pub use snippet::MarkdownSnippet;

/// Default quiet period before a working-copy change is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Tunables for [`EditingSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub debounce: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl SessionConfig {
    pub fn with_debounce_ms(debounce_ms: u64) -> Self {
        Self {
            debounce: Duration::from_millis(debounce_ms),
        }
    }
}
