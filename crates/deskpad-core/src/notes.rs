use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "date", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Ordered note collection, same position model as the task list.
#[derive(Debug, Clone, Default)]
pub struct NoteBoard {
    notes: Vec<Note>,
}

impl NoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Note> {
        self.notes.get(position)
    }

    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    /// Both fields are trimmed; the note is rejected if either ends up empty.
    pub fn add(&mut self, title: &str, content: &str) -> Option<&Note> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() || content.is_empty() {
            return None;
        }
        self.notes.push(Note::new(title, content));
        self.notes.last()
    }

    pub fn remove(&mut self, position: usize) -> Option<Note> {
        if position < self.notes.len() {
            Some(self.notes.remove(position))
        } else {
            None
        }
    }

    /// The last `limit` notes, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&Note> {
        self.notes.iter().rev().take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_requires_both_fields() {
        let mut board = NoteBoard::new();
        assert!(board.add("Title", "   ").is_none());
        assert!(board.add("  ", "body").is_none());
        assert!(board.is_empty());

        let note = board.add(" Groceries ", " eggs, flour ").unwrap();
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "eggs, flour");
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut board = NoteBoard::new();
        for i in 1..=5 {
            board.add(&format!("n{}", i), "x");
        }
        let titles: Vec<&str> = board.recent(3).iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["n5", "n4", "n3"]);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut board = NoteBoard::new();
        board.add("a", "b");
        assert!(board.remove(3).is_none());
        assert_eq!(board.len(), 1);
        assert!(board.remove(0).is_some());
        assert!(board.is_empty());
    }
}
