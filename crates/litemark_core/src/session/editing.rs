//! Working copy of the open note and its debounced commit.
//!
//! # Invariants
//! - Only the note currently open can be committed; a due deadline for any
//!   other id is dropped.
//! - Switching notes cancels the previous note's pending commit.
//! - A commit always carries the latest working copy (title, content, tags).
//! - The title-focus request fires at most once per newly created note.

use crate::model::note::{normalize_tag, Note, NoteId, TAG_MARKER};
use crate::service::note_service::{NotePatch, NoteService, NoteServiceResult, UpdateOutcome};
use crate::session::debounce::Debouncer;
use crate::session::export::ExportDocument;
use crate::session::snippet::MarkdownSnippet;
use crate::session::SessionConfig;
use crate::storage::KeyValueStore;
use log::debug;
use std::time::Instant;

/// Byte range selected in the content buffer; `start == end` is a caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }
}

/// Key that may commit the tag input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKey {
    Space,
    Enter,
}

/// What happened to the tag input after a commit key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEntry {
    /// The tag was appended and the input cleared.
    Added(String),
    /// The tag was already present; the input was cleared.
    Duplicate(String),
    /// Input is not a tag and stays as filter text.
    Ignored,
}

#[derive(Debug, Clone)]
struct Draft {
    note_id: NoteId,
    title: String,
    content: String,
    tags: Vec<String>,
}

impl Draft {
    fn from_note(note: &Note) -> Self {
        Self {
            note_id: note.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
        }
    }

    fn patch(&self) -> NotePatch {
        NotePatch::new()
            .title(self.title.clone())
            .content(self.content.clone())
            .tags(self.tags.clone())
    }
}

/// Editor state for at most one open note.
#[derive(Debug, Clone)]
pub struct EditingSession {
    draft: Option<Draft>,
    tag_input: String,
    selection: Selection,
    debouncer: Debouncer<NoteId>,
    title_focus: bool,
    last_new_note: Option<NoteId>,
}

impl Default for EditingSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl EditingSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            draft: None,
            tag_input: String::new(),
            selection: Selection::default(),
            debouncer: Debouncer::new(config.debounce),
            title_focus: false,
            last_new_note: None,
        }
    }

    /// Opens `note` for editing.
    ///
    /// Opening a different note cancels the previous note's pending commit
    /// and replaces the working copy. Re-opening the same note refreshes the
    /// working copy only when no commit is pending, so unsaved typing is
    /// never overwritten by a stale record.
    pub fn open(&mut self, note: &Note) {
        if let Some(previous) = self.note_id().map(str::to_string) {
            if previous == note.id {
                if !self.debouncer.is_pending(&previous) {
                    self.load(note);
                }
                return;
            }
            if self.debouncer.cancel(&previous) {
                debug!(
                    "event=session_switch module=session status=pending_dropped note_id={previous}"
                );
            }
        }
        self.load(note);
    }

    /// Opens a note that was just created and requests title focus once.
    pub fn open_new(&mut self, note: &Note) {
        self.open(note);
        if self.last_new_note.as_deref() != Some(note.id.as_str()) {
            self.last_new_note = Some(note.id.clone());
            self.title_focus = true;
        }
    }

    /// Returns `true` exactly once after [`EditingSession::open_new`].
    pub fn take_title_focus(&mut self) -> bool {
        std::mem::take(&mut self.title_focus)
    }

    /// Closes the editor, discarding any pending commit.
    pub fn close(&mut self) {
        if let Some(draft) = self.draft.take() {
            self.debouncer.cancel(&draft.note_id);
        }
        self.tag_input.clear();
        self.selection = Selection::default();
        self.title_focus = false;
    }

    pub fn note_id(&self) -> Option<&str> {
        self.draft.as_ref().map(|draft| draft.note_id.as_str())
    }

    pub fn title(&self) -> &str {
        self.draft.as_ref().map_or("", |draft| draft.title.as_str())
    }

    pub fn content(&self) -> &str {
        self.draft.as_ref().map_or("", |draft| draft.content.as_str())
    }

    pub fn tags(&self) -> &[String] {
        self.draft
            .as_ref()
            .map(|draft| draft.tags.as_slice())
            .unwrap_or_default()
    }

    /// Current tag-field text; doubles as list filter text.
    pub fn tag_input(&self) -> &str {
        &self.tag_input
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Deadline of the open note's pending commit, if any.
    pub fn pending_deadline(&self) -> Option<Instant> {
        let id = self.draft.as_ref()?.note_id.clone();
        self.debouncer.deadline(&id)
    }

    pub fn set_title(&mut self, title: impl Into<String>, now: Instant) {
        let Some(draft) = self.draft.as_mut() else {
            return;
        };
        draft.title = title.into();
        self.schedule_commit(now);
    }

    pub fn set_content(&mut self, content: impl Into<String>, now: Instant) {
        let Some(draft) = self.draft.as_mut() else {
            return;
        };
        draft.content = content.into();
        let content = draft.content.as_str();
        self.selection = Selection {
            start: clamp_to_char_boundary(content, self.selection.start),
            end: clamp_to_char_boundary(content, self.selection.end),
        };
        self.schedule_commit(now);
    }

    /// Moves the selection; offsets are clamped to the content and to char
    /// boundaries, and reversed ranges are normalized.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let content = self.content();
        let start = clamp_to_char_boundary(content, start);
        let end = clamp_to_char_boundary(content, end);
        self.selection = Selection { start, end };
    }

    pub fn set_tag_input(&mut self, text: impl Into<String>) {
        self.tag_input = text.into();
    }

    /// Handles space/enter in the tag field.
    ///
    /// The trimmed input becomes a tag when it starts with `#`, has a name
    /// after the marker and contains no whitespace. Otherwise it is left
    /// untouched as filter text.
    pub fn handle_tag_key(&mut self, _key: TagKey, now: Instant) -> TagEntry {
        let candidate = self.tag_input.trim();
        if !candidate.starts_with(TAG_MARKER) || candidate.chars().count() <= 1 {
            return TagEntry::Ignored;
        }
        let Ok(tag) = normalize_tag(candidate) else {
            return TagEntry::Ignored;
        };
        let Some(draft) = self.draft.as_mut() else {
            return TagEntry::Ignored;
        };

        self.tag_input.clear();
        if draft.tags.contains(&tag) {
            return TagEntry::Duplicate(tag);
        }
        draft.tags.push(tag.clone());
        self.schedule_commit(now);
        TagEntry::Added(tag)
    }

    /// Removes `tag` from the working copy; returns whether it was present.
    pub fn remove_tag(&mut self, tag: &str, now: Instant) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        let before = draft.tags.len();
        draft.tags.retain(|existing| existing != tag);
        if draft.tags.len() == before {
            return false;
        }
        self.schedule_commit(now);
        true
    }

    /// Replaces the selection with `snippet` and moves the caret to the
    /// snippet's documented offset.
    pub fn insert_snippet(&mut self, snippet: MarkdownSnippet, now: Instant) {
        let Some(draft) = self.draft.as_mut() else {
            return;
        };
        let start = clamp_to_char_boundary(&draft.content, self.selection.start);
        let end = clamp_to_char_boundary(&draft.content, self.selection.end).max(start);
        draft.content.replace_range(start..end, snippet.text());
        self.selection = Selection::caret(start + snippet.caret_offset());
        self.schedule_commit(now);
    }

    /// Standalone markdown document for the working copy.
    pub fn export(&self) -> Option<ExportDocument> {
        self.draft
            .as_ref()
            .map(|draft| ExportDocument::from_note(&draft.title, &draft.content))
    }

    /// Commits the open note when its debounce deadline has passed.
    ///
    /// Returns `Ok(None)` when nothing was due for the open note.
    pub fn tick<S: KeyValueStore>(
        &mut self,
        now: Instant,
        store: &mut NoteService<S>,
    ) -> NoteServiceResult<Option<UpdateOutcome>> {
        let mut outcome = None;
        for key in self.debouncer.take_due(now) {
            if self.note_id() != Some(key.as_str()) {
                debug!("event=session_commit module=session status=stale note_id={key}");
                continue;
            }
            outcome = Some(self.commit(store)?);
        }
        Ok(outcome)
    }

    /// Commits the open note immediately if a commit is pending.
    pub fn flush<S: KeyValueStore>(
        &mut self,
        store: &mut NoteService<S>,
    ) -> NoteServiceResult<Option<UpdateOutcome>> {
        let Some(id) = self.note_id().map(str::to_string) else {
            return Ok(None);
        };
        if !self.debouncer.cancel(&id) {
            return Ok(None);
        }
        self.commit(store).map(Some)
    }

    fn load(&mut self, note: &Note) {
        self.draft = Some(Draft::from_note(note));
        self.tag_input.clear();
        self.selection = Selection::caret(note.content.len());
    }

    fn schedule_commit(&mut self, now: Instant) {
        if let Some(draft) = self.draft.as_ref() {
            self.debouncer.schedule(draft.note_id.clone(), now);
        }
    }

    fn commit<S: KeyValueStore>(
        &self,
        store: &mut NoteService<S>,
    ) -> NoteServiceResult<UpdateOutcome> {
        let Some(draft) = self.draft.as_ref() else {
            return Ok(UpdateOutcome::NotFound);
        };
        let outcome = store.update(&draft.note_id, draft.patch())?;
        debug!(
            "event=session_commit module=session status={} note_id={}",
            outcome_label(&outcome),
            draft.note_id
        );
        Ok(outcome)
    }
}

fn outcome_label(outcome: &UpdateOutcome) -> &'static str {
    match outcome {
        UpdateOutcome::Updated(_) => "ok",
        UpdateOutcome::Unchanged => "unchanged",
        UpdateOutcome::NotFound => "not_found",
    }
}

fn clamp_to_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
