//! List row summaries derived from markdown content.
//!
//! Rules:
//! - `preview_image`: first markdown image path.
//! - `preview_text`: images dropped, links reduced to their label, markdown
//!   symbols removed, whitespace collapsed, first 100 chars kept.

use crate::model::note::{Note, NoteId};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

const PREVIEW_MAX_CHARS: usize = 100;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!|]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Markdown-derived preview fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownPreview {
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
}

/// Derives preview fields from markdown content.
pub fn derive_markdown_preview(content: &str) -> MarkdownPreview {
    let preview_image = MARKDOWN_IMAGE_RE
        .captures(content)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|value| !value.is_empty());

    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    let preview_text = if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
    };

    MarkdownPreview {
        preview_text,
        preview_image,
    }
}

/// One sidebar row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub id: NoteId,
    pub title: String,
    pub tags: Vec<String>,
    pub last_modified: DateTime<Utc>,
    pub preview: MarkdownPreview,
}

impl From<&Note> for NoteSummary {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            tags: note.tags.clone(),
            last_modified: note.last_modified,
            preview: derive_markdown_preview(&note.content),
        }
    }
}

/// Builds summaries preserving the input order.
pub fn summarize(notes: &[Note]) -> Vec<NoteSummary> {
    notes.iter().map(NoteSummary::from).collect()
}
