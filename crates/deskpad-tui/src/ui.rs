use chrono::Datelike;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap,
    },
};
use deskpad_core::calendar::WEEKDAY_HEADERS;
use deskpad_core::dashboard::{NO_NOTES, NO_PENDING_TASKS};
use deskpad_core::{CellKind, ChatRole, View};
use crate::app::{App, InputField, InputMode, NoteField};

/// Ensure the selected item in a list is visible by adjusting the ListState offset.
fn ensure_selected_visible(state: &mut ListState, visible_height: usize) {
    let visible_height = visible_height.max(1);

    if let Some(selected) = state.selected() {
        let min_offset = selected.saturating_sub(visible_height - 1);
        let max_offset = selected;

        let new_offset = state.offset().clamp(min_offset, max_offset);
        if new_offset != state.offset() {
            *state.offset_mut() = new_offset;
        }
    }
}

/// Wrap text to fit within a given width, returning multiple lines
/// Uses word boundaries for wrapping (doesn't break mid-word)
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Mask a credential, keeping only the last four characters readable
fn mask_key(key: &str) -> String {
    let len = key.chars().count();
    if len <= 4 {
        "*".repeat(len)
    } else {
        let masked_len = len - 4;
        let last_four: String = key.chars().skip(masked_len).collect();
        format!("{}...{}", "*".repeat(masked_len.min(20)), last_four)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    app.list_area = None;
    app.chat_area = None;
    match app.view() {
        View::Dashboard => render_dashboard(app, frame, body_area),
        View::Todo => render_todo(app, frame, body_area),
        View::Notes => render_notes(app, frame, body_area),
        View::Calendar => render_calendar(app, frame, body_area),
        View::Chat => render_chat(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.show_api_key_input {
        render_api_key_input(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let [tabs_area, version_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(10),
    ])
    .areas(area);

    let titles: Vec<Line> = View::all()
        .iter()
        .map(|view| Line::from(format!("{} {}", view.index() + 1, view.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.view().index())
        .style(Style::default().fg(Color::White).bg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).bold())
        .divider("|");
    frame.render_widget(tabs, tabs_area);

    let version = Paragraph::new(format!("v{} ", env!("CARGO_PKG_VERSION")))
        .style(Style::default().fg(Color::Gray).bg(Color::DarkGray))
        .right_aligned();
    frame.render_widget(version, version_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let keys: &[(&str, &str)] = if app.show_api_key_input {
        &[("Enter", "save key"), ("Esc", "cancel")]
    } else {
        match (app.view(), app.input_mode) {
            (View::Dashboard, _) => &[("1-5", "views"), ("r", "refresh"), ("q", "quit")],
            (View::Todo, InputMode::Normal) => &[
                ("i", "add"),
                ("j/k", "nav"),
                ("space", "toggle"),
                ("d", "delete"),
                ("q", "quit"),
            ],
            (View::Notes, InputMode::Normal) => {
                &[("i", "add"), ("j/k", "nav"), ("d", "delete"), ("q", "quit")]
            }
            (View::Notes, InputMode::Editing) => {
                &[("Tab", "switch field"), ("Enter", "next/save"), ("Esc", "done")]
            }
            (View::Calendar, _) => {
                &[("h/l", "month"), ("t", "today"), ("q", "quit")]
            }
            (View::Chat, InputMode::Normal) => &[
                ("i", "type"),
                ("K", "API key"),
                ("j/k", "scroll"),
                ("q", "quit"),
            ],
            (_, InputMode::Editing) => &[("Enter", "submit"), ("Esc", "done")],
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in keys {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    if let Some(status) = &app.status {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Red)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw a bordered single-line input, placing the terminal cursor when it is being edited
fn render_input(frame: &mut Frame, area: Rect, title: &str, field: &InputField, active: bool) {
    let border_color = if active { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", title));

    let inner_width = area.width.saturating_sub(2) as usize;
    // Keep the cursor in view on long input
    let skip = field.cursor.saturating_sub(inner_width.saturating_sub(1));
    let visible: String = field.value.chars().skip(skip).collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);

    if active {
        let cursor_x = (field.cursor - skip) as u16;
        frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
    }
}

fn render_dashboard(app: &mut App, frame: &mut Frame, area: Rect) {
    let [date_area, lists_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let date = Paragraph::new(Line::from(Span::styled(
        app.dashboard.date_line.clone(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL).title(" Today "));
    frame.render_widget(date, date_area);

    let [tasks_area, notes_area] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(lists_area);

    let task_lines: Vec<Line> = if app.dashboard.pending_tasks.is_empty() {
        vec![Line::from(Span::styled(NO_PENDING_TASKS, Style::default().fg(Color::DarkGray)))]
    } else {
        app.dashboard
            .pending_tasks
            .iter()
            .map(|text| Line::from(format!("• {}", text)))
            .collect()
    };
    let tasks = Paragraph::new(Text::from(task_lines))
        .block(Block::default().borders(Borders::ALL).title(" Pending Tasks "))
        .wrap(Wrap { trim: true });
    frame.render_widget(tasks, tasks_area);

    let note_lines: Vec<Line> = if app.dashboard.recent_notes.is_empty() {
        vec![Line::from(Span::styled(NO_NOTES, Style::default().fg(Color::DarkGray)))]
    } else {
        let mut lines = Vec::new();
        for note in &app.dashboard.recent_notes {
            lines.push(Line::from(Span::styled(
                note.title.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(note.preview.clone()));
            lines.push(Line::default());
        }
        lines
    };
    let notes = Paragraph::new(Text::from(note_lines))
        .block(Block::default().borders(Borders::ALL).title(" Recent Notes "))
        .wrap(Wrap { trim: true });
    frame.render_widget(notes, notes_area);
}

fn render_todo(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, list_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let editing = app.input_mode == InputMode::Editing && !app.show_api_key_input;
    render_input(frame, input_area, "New task", &app.todo_input, editing);

    app.list_area = Some(list_area);

    let tasks = app.workspace.tasks();
    let done = tasks.completed_count();
    let items: Vec<ListItem> = tasks
        .as_slice()
        .iter()
        .map(|task| {
            if task.completed {
                ListItem::new(Line::from(vec![
                    Span::styled("[x] ", Style::default().fg(Color::Green)),
                    Span::styled(
                        task.text.clone(),
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT),
                    ),
                ]))
            } else {
                ListItem::new(Line::from(vec![
                    Span::raw("[ ] "),
                    Span::raw(task.text.clone()),
                ]))
            }
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::DarkGray } else { Color::Cyan }))
        .title(format!(" Tasks ({}/{} done) ", done, tasks.len()));

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    ensure_selected_visible(&mut app.todo_state, list_area.height.saturating_sub(2) as usize);
    frame.render_stateful_widget(list, list_area, &mut app.todo_state);
}

fn render_notes(app: &mut App, frame: &mut Frame, area: Rect) {
    let [title_area, content_area, list_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let editing = app.input_mode == InputMode::Editing && !app.show_api_key_input;
    render_input(
        frame,
        title_area,
        "Note title",
        &app.note_title,
        editing && app.note_field == NoteField::Title,
    );
    render_input(
        frame,
        content_area,
        "Note content",
        &app.note_content,
        editing && app.note_field == NoteField::Content,
    );

    app.list_area = Some(list_area);

    let wrap_width = list_area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .workspace
        .notes()
        .as_slice()
        .iter()
        .map(|note| {
            let mut lines = vec![Line::from(Span::styled(
                note.title.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ))];
            for paragraph in note.content.lines() {
                for line in wrap_text_to_width(paragraph, wrap_width) {
                    lines.push(Line::from(line));
                }
            }
            lines.push(Line::default());
            ListItem::new(lines)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::DarkGray } else { Color::Cyan }))
        .title(format!(" Notes ({}) ", app.workspace.notes().len()));

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, list_area, &mut app.notes_state);
}

fn render_calendar(app: &mut App, frame: &mut Frame, area: Rect) {
    let today = app.today();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", app.calendar.title()));

    let grid = match app.calendar.grid(today) {
        Ok(grid) => grid,
        Err(err) => {
            let message = Paragraph::new(format!("Could not lay out month: {}", err)).block(block);
            frame.render_widget(message, area);
            return;
        }
    };

    let header = Row::new(
        WEEKDAY_HEADERS
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).bold())),
    );

    let rows: Vec<Row> = grid
        .weeks()
        .map(|week| {
            Row::new(week.iter().map(|cell| {
                let style = match cell.kind {
                    CellKind::CurrentMonth if cell.is_today => Style::default()
                        .bg(Color::Cyan)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD),
                    CellKind::CurrentMonth => Style::default().fg(Color::White),
                    CellKind::PreviousMonth | CellKind::NextMonth => {
                        Style::default().fg(Color::DarkGray)
                    }
                };
                Cell::from(format!("{:>3}", cell.day)).style(style)
            }))
            .height(2)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
        .header(header.bottom_margin(1))
        .block(block);
    frame.render_widget(table, area);

    // Hint when browsing away from the current month
    if app.calendar.year != today.year() || app.calendar.month0 != today.month0() {
        let hint = Paragraph::new(Span::styled(
            " t: back to today ",
            Style::default().fg(Color::DarkGray),
        ))
        .right_aligned();
        let hint_area = Rect::new(
            area.x + 1,
            area.y + area.height.saturating_sub(1),
            area.width.saturating_sub(2),
            1,
        );
        frame.render_widget(hint, hint_area);
    }
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.chat_area = Some(chat_area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let key_status = if app.workspace.has_stored_credential() {
        "key saved"
    } else if app.workspace.credential().is_some() {
        "key from env"
    } else {
        "no key: press K"
    };
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Gemini: {} ({}) ", app.model_name, key_status));

    let chat = app.workspace.chat();
    let chat_text = if chat.messages().is_empty() && !chat.is_thinking() {
        Text::from(Span::styled(
            "Ask me anything...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in chat.messages() {
            let (label, color) = match msg.role {
                ChatRole::User => ("You:", Color::Cyan),
                ChatRole::Assistant => ("AI:", Color::Yellow),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for line in msg.content.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if chat.is_thinking() {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let paragraph = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(paragraph, chat_area);

    let editing = app.input_mode == InputMode::Editing && !app.show_api_key_input;
    let title = if app.workspace.chat().is_thinking() {
        "Message (waiting for reply)"
    } else {
        "Message"
    };
    render_input(frame, input_area, title, &app.chat_input, editing);
}

/// Centre a `width` x `height` box in `area`, shrinking it to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// One-line row `offset` lines into `inner`, if the popup is tall enough to show it
fn popup_row(inner: Rect, offset: u16) -> Option<Rect> {
    (offset < inner.height).then(|| Rect::new(inner.x, inner.y + offset, inner.width, 1))
}

fn render_api_key_input(app: &App, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60.min(area.width.saturating_sub(4)), 7, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Enter Gemini API Key ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if let Some(row) = popup_row(inner, 0) {
        let instructions =
            Paragraph::new("Paste your API key below. Press Enter to save, Esc to cancel.")
                .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(instructions, row);
    }

    if let Some(input_area) = popup_row(inner, 2) {
        let display_text = mask_key(&app.api_key_input.value);
        let cursor_x = display_text.chars().count().min(input_area.width as usize) as u16;
        frame.render_widget(
            Paragraph::new(display_text).style(Style::default().fg(Color::Cyan)),
            input_area,
        );
        frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
    }

    if let Some(row) = popup_row(inner, 4) {
        let char_count = format!("{} characters", app.api_key_input.value.chars().count());
        let status = Paragraph::new(char_count).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(status, row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_to_width() {
        assert_eq!(
            wrap_text_to_width("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_text_to_width("", 10), vec![""]);
        assert_eq!(wrap_text_to_width("unbreakableword", 5), vec!["unbreakableword"]);
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(""), "");
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key("abcdefgh"), "****...efgh");
    }

    #[test]
    fn test_popup_fits_short_terminal() {
        let area = Rect::new(0, 0, 80, 5);
        let popup = centered_rect(60, 7, area);
        assert_eq!(popup, Rect::new(10, 0, 60, 5));
        assert!(popup.bottom() <= area.bottom());

        let inner = Rect::new(11, 1, 58, 3);
        assert!(popup_row(inner, 2).is_some());
        assert_eq!(popup_row(inner, 4), None);
    }

    #[test]
    fn test_api_key_popup_renders_in_tiny_terminal() {
        use deskpad_core::{FileStore, GeminiClient, Workspace};
        use ratatui::{backend::TestBackend, Terminal};
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::load(FileStore::open(dir.path()).unwrap(), None).unwrap();
        let mut app = App::new(workspace, Arc::new(GeminiClient::default()), "test-model");
        app.open_api_key_input();
        for c in "abcdefgh".chars() {
            app.api_key_input.insert(c);
        }

        for height in [3, 5, 7, 24] {
            let mut terminal = Terminal::new(TestBackend::new(40, height)).unwrap();
            terminal.draw(|frame| render(&mut app, frame)).unwrap();
        }
    }

    #[test]
    fn test_ensure_selected_visible() {
        let mut state = ListState::default();
        state.select(Some(10));
        ensure_selected_visible(&mut state, 4);
        assert_eq!(state.offset(), 7);

        state.select(Some(2));
        ensure_selected_visible(&mut state, 4);
        assert_eq!(state.offset(), 2);
    }
}
