//! Read-only summary over the task list and note board.

use chrono::NaiveDate;

use crate::notes::NoteBoard;
use crate::tasks::TaskList;

pub const PENDING_TASK_LIMIT: usize = 5;
pub const RECENT_NOTE_LIMIT: usize = 3;
pub const PREVIEW_CHARS: usize = 50;

pub const NO_PENDING_TASKS: &str = "No pending tasks";
pub const NO_NOTES: &str = "No notes yet";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePreview {
    pub title: String,
    pub preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub date_line: String,
    pub pending_tasks: Vec<String>,
    pub recent_notes: Vec<NotePreview>,
}

impl DashboardSummary {
    pub fn build(tasks: &TaskList, notes: &NoteBoard, today: NaiveDate) -> Self {
        let pending_tasks = tasks
            .pending(PENDING_TASK_LIMIT)
            .into_iter()
            .map(|t| t.text.clone())
            .collect();

        let recent_notes = notes
            .recent(RECENT_NOTE_LIMIT)
            .into_iter()
            .map(|n| NotePreview {
                title: n.title.clone(),
                preview: truncate_preview(&n.content, PREVIEW_CHARS),
            })
            .collect();

        Self {
            date_line: long_date(today),
            pending_tasks,
            recent_notes,
        }
    }
}

/// "Saturday, October 17, 2026"
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Cuts `content` to `max_chars` characters, appending "..." when anything was dropped.
pub fn truncate_preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &content[..byte_idx]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_preview_boundaries() {
        let exactly_fifty = "a".repeat(50);
        assert_eq!(truncate_preview(&exactly_fifty, 50), exactly_fifty);

        let fifty_one = "b".repeat(51);
        assert_eq!(truncate_preview(&fifty_one, 50), format!("{}...", "b".repeat(50)));

        assert_eq!(truncate_preview("short", 50), "short");
        assert_eq!(truncate_preview("", 50), "");
    }

    #[test]
    fn test_truncate_preview_counts_chars_not_bytes() {
        let accented = "é".repeat(60);
        let preview = truncate_preview(&accented, 50);
        assert_eq!(preview.chars().count(), 53);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_long_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(long_date(date), "Saturday, October 17, 2026");
        let date = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        assert_eq!(long_date(date), "Monday, February 5, 2024");
    }

    #[test]
    fn test_empty_collections() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let summary = DashboardSummary::build(&TaskList::new(), &NoteBoard::new(), today);
        assert!(summary.pending_tasks.is_empty());
        assert!(summary.recent_notes.is_empty());
    }
}
