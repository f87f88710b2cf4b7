use std::sync::Arc;

use chrono::{Local, NaiveDate};
use log::error;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use deskpad_core::{
    ChatError, DashboardSummary, FileStore, MonthCursor, Reply, Router, TextGenerator, View,
    Workspace,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteField {
    #[default]
    Title,
    Content,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text input with a character cursor.
#[derive(Debug, Clone, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
}

impl InputField {
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub router: Router,
    pub input_mode: InputMode,
    pub workspace: Workspace<FileStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub model_name: String,
    pub status: Option<String>,
    /// Fixed "today" for tests; `None` means the local date.
    pub today_override: Option<NaiveDate>,

    // Dashboard state
    pub dashboard: DashboardSummary,

    // To-do state
    pub todo_input: InputField,
    pub todo_state: ListState,

    // Notes state
    pub note_title: InputField,
    pub note_content: InputField,
    pub note_field: NoteField,
    pub notes_state: ListState,

    // Calendar state
    pub calendar: MonthCursor,

    // Chat state
    pub chat_input: InputField,
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub chat_task: Option<JoinHandle<Result<Reply, ChatError>>>,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // API key input state
    pub show_api_key_input: bool,
    pub api_key_input: InputField,

    // Panel areas for mouse hit-testing (updated during render)
    pub list_area: Option<Rect>,
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(
        workspace: Workspace<FileStore>,
        generator: Arc<dyn TextGenerator>,
        model_name: &str,
    ) -> Self {
        let today = Local::now().date_naive();
        let dashboard = workspace.dashboard(today);

        let mut app = Self {
            should_quit: false,
            router: Router::new(),
            input_mode: InputMode::Normal,
            workspace,
            generator,
            model_name: model_name.to_string(),
            status: None,
            today_override: None,

            dashboard,

            todo_input: InputField::default(),
            todo_state: ListState::default(),

            note_title: InputField::default(),
            note_content: InputField::default(),
            note_field: NoteField::Title,
            notes_state: ListState::default(),

            calendar: MonthCursor::containing(today),

            chat_input: InputField::default(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_task: None,
            animation_frame: 0,

            show_api_key_input: false,
            api_key_input: InputField::default(),

            list_area: None,
            chat_area: None,
        };
        app.clamp_todo_selection();
        app.clamp_note_selection();
        app
    }

    pub fn today(&self) -> NaiveDate {
        self.today_override
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn view(&self) -> View {
        self.router.active()
    }

    // View switching
    pub fn activate(&mut self, view: View) {
        if self.router.activate(view) {
            self.refresh_dashboard();
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn next_view(&mut self) {
        if self.router.next() {
            self.refresh_dashboard();
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn prev_view(&mut self) {
        if self.router.prev() {
            self.refresh_dashboard();
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn refresh_dashboard(&mut self) {
        self.dashboard = self.workspace.dashboard(self.today());
    }

    fn report(&mut self, result: anyhow::Result<bool>) -> bool {
        match result {
            Ok(changed) => {
                if changed {
                    self.status = None;
                    self.refresh_dashboard();
                }
                changed
            }
            Err(err) => {
                error!("event=persist_failed error={:#}", err);
                self.status = Some(format!("Could not save: {}", err));
                false
            }
        }
    }

    // To-do actions
    pub fn submit_todo(&mut self) {
        let result = self.workspace.add_task(&self.todo_input.value);
        if self.report(result) {
            self.todo_input.clear();
            let last = self.workspace.tasks().len().saturating_sub(1);
            self.todo_state.select(Some(last));
        }
    }

    pub fn toggle_selected_todo(&mut self) {
        if let Some(i) = self.todo_state.selected() {
            let result = self.workspace.toggle_task(i);
            self.report(result);
        }
    }

    pub fn remove_selected_todo(&mut self) {
        if let Some(i) = self.todo_state.selected() {
            let result = self.workspace.remove_task(i);
            if self.report(result) {
                self.clamp_todo_selection();
            }
        }
    }

    pub fn todo_nav_down(&mut self) {
        let len = self.workspace.tasks().len();
        if len > 0 {
            let i = self.todo_state.selected().unwrap_or(0);
            self.todo_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn todo_nav_up(&mut self) {
        let i = self.todo_state.selected().unwrap_or(0);
        self.todo_state.select(Some(i.saturating_sub(1)));
    }

    fn clamp_todo_selection(&mut self) {
        let len = self.workspace.tasks().len();
        if len == 0 {
            self.todo_state.select(None);
        } else {
            let i = self.todo_state.selected().unwrap_or(0);
            self.todo_state.select(Some(i.min(len - 1)));
        }
    }

    // Notes actions
    pub fn active_note_field(&mut self) -> &mut InputField {
        match self.note_field {
            NoteField::Title => &mut self.note_title,
            NoteField::Content => &mut self.note_content,
        }
    }

    pub fn switch_note_field(&mut self) {
        self.note_field = match self.note_field {
            NoteField::Title => NoteField::Content,
            NoteField::Content => NoteField::Title,
        };
    }

    pub fn submit_note(&mut self) {
        let result = self
            .workspace
            .add_note(&self.note_title.value, &self.note_content.value);
        if self.report(result) {
            self.note_title.clear();
            self.note_content.clear();
            self.note_field = NoteField::Title;
            let last = self.workspace.notes().len().saturating_sub(1);
            self.notes_state.select(Some(last));
        }
    }

    pub fn remove_selected_note(&mut self) {
        if let Some(i) = self.notes_state.selected() {
            let result = self.workspace.remove_note(i);
            if self.report(result) {
                self.clamp_note_selection();
            }
        }
    }

    pub fn notes_nav_down(&mut self) {
        let len = self.workspace.notes().len();
        if len > 0 {
            let i = self.notes_state.selected().unwrap_or(0);
            self.notes_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn notes_nav_up(&mut self) {
        let i = self.notes_state.selected().unwrap_or(0);
        self.notes_state.select(Some(i.saturating_sub(1)));
    }

    fn clamp_note_selection(&mut self) {
        let len = self.workspace.notes().len();
        if len == 0 {
            self.notes_state.select(None);
        } else {
            let i = self.notes_state.selected().unwrap_or(0);
            self.notes_state.select(Some(i.min(len - 1)));
        }
    }

    // Calendar actions
    pub fn calendar_next(&mut self) {
        self.calendar.next();
    }

    pub fn calendar_prev(&mut self) {
        self.calendar.prev();
    }

    pub fn calendar_today(&mut self) {
        self.calendar = MonthCursor::containing(self.today());
    }

    // Chat actions
    pub fn submit_chat(&mut self) {
        if let Some(request) = self.workspace.submit_chat(&self.chat_input.value) {
            self.chat_input.clear();
            let generator = Arc::clone(&self.generator);
            self.chat_task = Some(tokio::spawn(async move {
                generator.generate(&request.api_key, &request.prompt).await
            }));
        }
        self.scroll_chat_to_bottom();
    }

    /// Feeds a finished chat request back into the transcript.
    pub async fn poll_chat_task(&mut self) {
        let finished = self
            .chat_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.chat_task.take() {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(err) => Err(ChatError::Interrupted(err.to_string())),
            };
            self.workspace.complete_chat(outcome);
            self.scroll_chat_to_bottom();
        }
    }

    pub fn open_api_key_input(&mut self) {
        self.show_api_key_input = true;
        self.api_key_input.clear();
    }

    pub fn close_api_key_input(&mut self) {
        self.show_api_key_input = false;
        self.api_key_input.clear();
    }

    pub fn submit_api_key(&mut self) {
        let result = self.workspace.save_credential(&self.api_key_input.value);
        if self.report(result) {
            self.scroll_chat_to_bottom();
        }
        self.close_api_key_input();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.workspace.chat().is_thinking() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll chat so the newest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in self.workspace.chat().messages() {
            total_lines += 1; // Role line ("You:" or "AI:")
            for line in msg.content.lines() {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.workspace.chat().is_thinking() {
            total_lines += 2; // "AI:" + "Thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }
}
