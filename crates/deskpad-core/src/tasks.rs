//! To-do list

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A to-do task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Generated at creation. Older records without one get a fresh id on load,
    /// and records without a date are stamped with the load time.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "date", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Ordered task collection. Positions shift down when a task is removed.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Task> {
        self.tasks.get(position)
    }

    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Appends a new incomplete task. Blank input is ignored.
    pub fn add(&mut self, text: &str) -> Option<&Task> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.tasks.push(Task::new(text));
        self.tasks.last()
    }

    /// Flips the completion flag, returning the new value.
    pub fn toggle(&mut self, position: usize) -> Option<bool> {
        let task = self.tasks.get_mut(position)?;
        task.completed = !task.completed;
        Some(task.completed)
    }

    pub fn remove(&mut self, position: usize) -> Option<Task> {
        if position < self.tasks.len() {
            Some(self.tasks.remove(position))
        } else {
            None
        }
    }

    /// The first `limit` incomplete tasks, in insertion order.
    pub fn pending(&self, limit: usize) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| !t.completed)
            .take(limit)
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}
