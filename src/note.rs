// this_file: src/note.rs
//! Notes as seen by the layout engine

use serde::{Deserialize, Serialize};

/// A single short text note. Sequence order is rendering order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Note {
    /// Opaque identifier owned by the caller
    pub id: String,
    /// Note text, may contain explicit line breaks
    pub text: String,
    /// Completed notes render dimmed with a strikethrough
    #[serde(default)]
    pub is_completed: bool,
}

impl Note {
    /// Create an active note
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_completed: false,
        }
    }

    /// Create a completed note
    pub fn completed(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            is_completed: true,
            ..Self::new(id, text)
        }
    }
}

/// Whether completed notes take part in layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletedNotePolicy {
    /// Completed notes are dropped before fitting and drawing
    #[default]
    Exclude,
    /// Completed notes stay in sequence, consume space, and render dimmed
    IncludeDimmed,
}

/// Filter a note sequence down to the notes eligible for layout, keeping order.
pub fn eligible_notes(notes: &[Note], policy: CompletedNotePolicy) -> Vec<&Note> {
    match policy {
        CompletedNotePolicy::Exclude => notes.iter().filter(|n| !n.is_completed).collect(),
        CompletedNotePolicy::IncludeDimmed => notes.iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Note> {
        vec![
            Note::new("1", "first"),
            Note::completed("2", "second"),
            Note::new("3", "third"),
            Note::completed("4", "fourth"),
        ]
    }

    #[test]
    fn test_exclude_drops_completed_and_keeps_order() {
        let notes = sample();
        let eligible = eligible_notes(&notes, CompletedNotePolicy::Exclude);
        let ids: Vec<&str> = eligible.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_include_dimmed_keeps_everything() {
        let notes = sample();
        let eligible = eligible_notes(&notes, CompletedNotePolicy::IncludeDimmed);
        assert_eq!(eligible.len(), 4);
        assert!(eligible[1].is_completed);
    }

    #[test]
    fn test_note_deserializes_without_completed_flag() {
        let note: Note = serde_json::from_str(r#"{"id": "a", "text": "Buy milk"}"#).unwrap();
        assert_eq!(note, Note::new("a", "Buy milk"));
    }

    #[test]
    fn test_default_policy_is_exclude() {
        assert_eq!(CompletedNotePolicy::default(), CompletedNotePolicy::Exclude);
    }
}
