pub mod ai;
pub mod calendar;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod notes;
pub mod store;
pub mod tasks;
pub mod view;
pub mod workspace;

// Re-export main types for convenience
pub use ai::{ChatError, GeminiClient, Reply, TextGenerator};
pub use calendar::{month_grid, CellKind, DayCell, MonthCursor, MonthGrid};
pub use chat::{Chat, ChatMessage, ChatPhase, ChatRole, PendingRequest};
pub use config::Config;
pub use dashboard::{DashboardSummary, NotePreview};
pub use notes::{Note, NoteBoard};
pub use store::{FileStore, KeyValueStore, MemoryStore, Storage};
pub use tasks::{Task, TaskList};
pub use view::{Router, View};
pub use workspace::Workspace;
