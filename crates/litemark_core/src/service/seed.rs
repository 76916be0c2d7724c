//! Built-in notes written on first run.

use crate::model::note::Note;
use chrono::{DateTime, Utc};

pub const WELCOME_NOTE_ID: &str = "default-note";
pub const GUIDE_NOTE_ID: &str = "default-long-note";

const SEED_TAG: &str = "#tutorial";

/// Returns the seed notes in insertion order (guide first, welcome last).
pub fn seed_notes(now: DateTime<Utc>) -> Vec<Note> {
    vec![
        seed_note(
            GUIDE_NOTE_ID,
            "Markdown guide",
            include_str!("seed/markdown_guide.md"),
            now,
        ),
        seed_note(
            WELCOME_NOTE_ID,
            "Welcome to LiteMark",
            include_str!("seed/welcome.md"),
            now,
        ),
    ]
}

fn seed_note(id: &str, title: &str, content: &str, now: DateTime<Utc>) -> Note {
    let mut note = Note::with_id(id, title, content, now);
    note.tags.push(SEED_TAG.to_string());
    note
}

#[cfg(test)]
mod tests {
    use super::seed_notes;
    use crate::model::note::normalize_tags;
    use chrono::Utc;

    #[test]
    fn seed_notes_have_unique_ids_and_valid_tags() {
        let notes = seed_notes(Utc::now());
        assert_eq!(notes.len(), 2);
        assert_ne!(notes[0].id, notes[1].id);
        for note in &notes {
            assert!(!note.content.is_empty());
            assert_eq!(normalize_tags(&note.tags).unwrap(), note.tags);
        }
    }
}
