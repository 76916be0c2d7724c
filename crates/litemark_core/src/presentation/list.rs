//! Search-filtered, recency-sorted note listings.

use crate::model::note::Note;
use std::cmp::Ordering;

/// Orders notes newest first; equal timestamps fall back to id ascending so
/// the order is stable across reloads.
pub fn sort_by_recency(notes: &mut [Note]) {
    notes.sort_by(recency_order);
}

fn recency_order(left: &Note, right: &Note) -> Ordering {
    right
        .last_modified
        .cmp(&left.last_modified)
        .then_with(|| left.id.cmp(&right.id))
}

/// Returns whether `note` matches a case-insensitive substring query over
/// title, content and tags. A blank query matches everything.
pub fn matches_query(note: &Note, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    contains_folded(&note.title, &needle)
        || contains_folded(&note.content, &needle)
        || note.tags.iter().any(|tag| contains_folded(tag, &needle))
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}

/// Filters `notes` by `query` and sorts the result by recency.
pub fn filter_notes(notes: &[Note], query: &str) -> Vec<Note> {
    let mut visible = notes
        .iter()
        .filter(|note| matches_query(note, query))
        .cloned()
        .collect::<Vec<_>>();
    sort_by_recency(&mut visible);
    visible
}

/// Trash view rows: every deleted note, newest first, no filtering.
pub fn trash_listing(deleted: &[Note]) -> Vec<Note> {
    let mut rows = deleted.to_vec();
    sort_by_recency(&mut rows);
    rows
}

/// Sidebar list state. Owns only the search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListView {
    query: String,
}

impl NoteListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Projects the active collection through the current query.
    pub fn visible(&self, active: &[Note]) -> Vec<Note> {
        filter_notes(active, &self.query)
    }
}
