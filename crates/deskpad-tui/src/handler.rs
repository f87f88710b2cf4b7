use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use deskpad_core::View;
use crate::app::{App, InputMode, NoteField};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    app.poll_chat_task().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_api_key_input {
        handle_api_key_input(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.next_view();
            return;
        }
        KeyCode::BackTab => {
            app.prev_view();
            return;
        }
        KeyCode::Char(c @ '1'..='5') => {
            if let Some(view) = c.to_digit(10).and_then(|d| View::from_index(d as usize - 1)) {
                app.activate(view);
            }
            return;
        }
        _ => {}
    }

    match app.view() {
        View::Dashboard => handle_dashboard_normal(app, key),
        View::Todo => handle_todo_normal(app, key),
        View::Notes => handle_notes_normal(app, key),
        View::Calendar => handle_calendar_normal(app, key),
        View::Chat => handle_chat_normal(app, key),
    }
}

fn handle_dashboard_normal(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('r') {
        app.refresh_dashboard();
    }
}

fn handle_todo_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.todo_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.todo_nav_up(),
        KeyCode::Char('g') => {
            if !app.workspace.tasks().is_empty() {
                app.todo_state.select(Some(0));
            }
        }
        KeyCode::Char('G') => {
            let len = app.workspace.tasks().len();
            if len > 0 {
                app.todo_state.select(Some(len - 1));
            }
        }
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('x') => app.toggle_selected_todo(),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_selected_todo(),
        KeyCode::Char('i') | KeyCode::Char('a') => app.input_mode = InputMode::Editing,
        _ => {}
    }
}

fn handle_notes_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.notes_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.notes_nav_up(),
        KeyCode::Char('d') | KeyCode::Delete => app.remove_selected_note(),
        KeyCode::Char('i') | KeyCode::Char('a') => {
            app.note_field = NoteField::Title;
            app.input_mode = InputMode::Editing;
        }
        _ => {}
    }
}

fn handle_calendar_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('p') => app.calendar_prev(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('n') => app.calendar_next(),
        KeyCode::Char('t') => app.calendar_today(),
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('i') | KeyCode::Char('a') => app.input_mode = InputMode::Editing,
        KeyCode::Char('K') => app.open_api_key_input(),
        KeyCode::Char('j') | KeyCode::Down => app.chat_scroll = app.chat_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.chat_scroll = app.chat_scroll.saturating_sub(1),
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return;
    }

    match app.view() {
        View::Todo => match key.code {
            KeyCode::Enter => app.submit_todo(),
            _ => edit_field(&mut app.todo_input, key),
        },
        View::Notes => match key.code {
            KeyCode::Tab | KeyCode::BackTab => app.switch_note_field(),
            KeyCode::Enter => match app.note_field {
                NoteField::Title => app.note_field = NoteField::Content,
                NoteField::Content => app.submit_note(),
            },
            _ => edit_field(app.active_note_field(), key),
        },
        View::Chat => match key.code {
            KeyCode::Enter => app.submit_chat(),
            _ => edit_field(&mut app.chat_input, key),
        },
        View::Dashboard | View::Calendar => app.input_mode = InputMode::Normal,
    }
}

fn handle_api_key_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_api_key_input(),
        KeyCode::Enter => app.submit_api_key(),
        _ => edit_field(&mut app.api_key_input, key),
    }
}

fn edit_field(field: &mut crate::app::InputField, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.left(),
        KeyCode::Right => field.right(),
        KeyCode::Home => field.home(),
        KeyCode::End => field.end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => field.insert(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_list = app.list_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => match app.view() {
            View::Todo if in_list => app.todo_nav_down(),
            View::Notes if in_list => app.notes_nav_down(),
            View::Calendar => app.calendar_next(),
            View::Chat if in_chat => app.chat_scroll = app.chat_scroll.saturating_add(3),
            _ => {}
        },
        MouseEventKind::ScrollUp => match app.view() {
            View::Todo if in_list => app.todo_nav_up(),
            View::Notes if in_list => app.notes_nav_up(),
            View::Calendar => app.calendar_prev(),
            View::Chat if in_chat => app.chat_scroll = app.chat_scroll.saturating_sub(3),
            _ => {}
        },
        _ => {}
    }
}
