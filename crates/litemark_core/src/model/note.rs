//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record persisted in both collections.
//! - Own tag validation and order-preserving normalization.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `tags` never contains duplicates and keeps insertion order.
//! - Every tag starts with [`TAG_MARKER`], is longer than the marker alone and
//!   contains no whitespace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Leading character that marks a tag (`#work`).
pub const TAG_MARKER: char = '#';

/// Title given to notes created without user input.
pub const DEFAULT_NOTE_TITLE: &str = "Untitled";

/// Stable identifier of one note.
///
/// Kept as a type alias so seed notes can use readable fixed ids while new
/// notes get UUID v4 strings.
pub type NoteId = String;

/// Canonical note record.
///
/// Field names serialize in camelCase to match the persisted layout
/// (`lastModified`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Bumped on every committed title/content/tag change.
    pub last_modified: DateTime<Utc>,
}

impl Note {
    /// Creates an empty note with a generated id and the default title.
    pub fn new(last_modified: DateTime<Utc>) -> Self {
        Self::with_id(generate_note_id(), DEFAULT_NOTE_TITLE, "", last_modified)
    }

    /// Creates a note with a caller-provided id.
    ///
    /// Used by seeding where identity is fixed ahead of time.
    pub fn with_id(
        id: impl Into<NoteId>,
        title: impl Into<String>,
        content: impl Into<String>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            last_modified,
        }
    }

    /// Returns whether this note carries `tag` (exact match).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|value| value == tag)
    }
}

/// Allocates a collision-resistant note id.
pub fn generate_note_id() -> NoteId {
    Uuid::new_v4().to_string()
}

/// Tag validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// Empty after trimming.
    Empty,
    /// Does not start with the tag marker.
    MissingMarker(String),
    /// Only the marker, no name.
    MarkerOnly,
    /// Contains whitespace inside the tag.
    ContainsWhitespace(String),
}

impl Display for TagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "tag cannot be empty"),
            Self::MissingMarker(value) => {
                write!(f, "tag `{value}` must start with `{TAG_MARKER}`")
            }
            Self::MarkerOnly => write!(f, "tag needs a name after `{TAG_MARKER}`"),
            Self::ContainsWhitespace(value) => {
                write!(f, "tag `{value}` cannot contain whitespace")
            }
        }
    }
}

impl Error for TagError {}

/// Validates one tag value and returns its trimmed form.
pub fn normalize_tag(tag: &str) -> Result<String, TagError> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(TagError::Empty);
    }
    if !trimmed.starts_with(TAG_MARKER) {
        return Err(TagError::MissingMarker(trimmed.to_string()));
    }
    if trimmed.chars().count() == 1 {
        return Err(TagError::MarkerOnly);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(TagError::ContainsWhitespace(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Validates tags and drops later duplicates, keeping first-seen order.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, TagError> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let value = normalize_tag(tag)?;
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    Ok(unique)
}
