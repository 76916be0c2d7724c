//! Read-only projections of the note collections for display.
//!
//! # Responsibility
//! - Filter and sort notes for the sidebar list and the trash view.
//! - Derive the tag index and row previews.
//!
//! # Invariants
//! - Projections never mutate or persist notes.
//! - Listings are ordered by `last_modified` descending, then id ascending.

pub mod list;
pub mod preview;
pub mod tags;

pub use list::{filter_notes, matches_query, sort_by_recency, trash_listing, NoteListView};
pub use preview::{derive_markdown_preview, summarize, MarkdownPreview, NoteSummary};
pub use tags::{tag_index, TagBrowser, TagCount};
