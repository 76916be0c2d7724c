//! Tag index and the expandable tag browser.

use crate::model::note::Note;
use crate::presentation::list::sort_by_recency;
use std::collections::BTreeMap;

/// One row of the tag browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Counts notes per tag, sorted by tag.
pub fn tag_index(notes: &[Note]) -> Vec<TagCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for note in notes {
        for tag in &note.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect()
}

/// Tag browser state: at most one tag is expanded at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBrowser {
    expanded: Option<String>,
}

impl TagBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    /// Expands `tag`, collapsing any other; toggling the expanded tag
    /// collapses it.
    pub fn toggle(&mut self, tag: &str) {
        if self.expanded.as_deref() == Some(tag) {
            self.expanded = None;
        } else {
            self.expanded = Some(tag.to_string());
        }
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    /// Notes carrying the expanded tag, newest first. Empty when collapsed.
    pub fn expanded_notes(&self, notes: &[Note]) -> Vec<Note> {
        let Some(tag) = self.expanded.as_deref() else {
            return Vec::new();
        };
        let mut matching = notes
            .iter()
            .filter(|note| note.has_tag(tag))
            .cloned()
            .collect::<Vec<_>>();
        sort_by_recency(&mut matching);
        matching
    }
}
