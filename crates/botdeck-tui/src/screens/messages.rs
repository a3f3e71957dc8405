//! Messages screen: send a direct message to one bot user.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::TextField;
use crate::effects::UiEffect;
use crate::state::{MessageField, TuiState};

pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    if state.messages.sending {
        return vec![];
    }

    let Some(focus) = state.messages.focus else {
        // Navigating: Enter starts editing.
        if key.code == KeyCode::Enter {
            state.messages.focus = Some(MessageField::ChatId);
        }
        return vec![];
    };

    match key.code {
        KeyCode::Esc => {
            state.messages.focus = None;
            vec![]
        }
        KeyCode::Up | KeyCode::Down => {
            state.messages.focus = Some(match focus {
                MessageField::ChatId => MessageField::Text,
                MessageField::Text => MessageField::ChatId,
            });
            vec![]
        }
        KeyCode::Enter => match focus {
            MessageField::ChatId => {
                state.messages.focus = Some(MessageField::Text);
                vec![]
            }
            MessageField::Text => submit(state),
        },
        _ => {
            edit_field(field_mut(state, focus), key);
            vec![]
        }
    }
}

fn submit(state: &mut TuiState) -> Vec<UiEffect> {
    let Ok(chat_id) = state.messages.chat_id.value().trim().parse::<i64>() else {
        state.set_flash("Chat id must be a number", true);
        return vec![];
    };
    let text = state.messages.text.value().trim().to_string();
    if text.is_empty() {
        state.set_flash("Message text must not be empty", true);
        return vec![];
    }
    state.messages.sending = true;
    vec![UiEffect::SendDirectMessage { chat_id, text }]
}

fn field_mut(state: &mut TuiState, field: MessageField) -> &mut TextField {
    match field {
        MessageField::ChatId => &mut state.messages.chat_id,
        MessageField::Text => &mut state.messages.text,
    }
}

fn edit_field(field: &mut TextField, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => field.insert(c),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Left => field.move_left(),
        KeyCode::Right => field.move_right(),
        KeyCode::Home => field.move_home(),
        KeyCode::End => field.move_end(),
        _ => {}
    }
}

pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Direct message ")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

    render_field(
        frame,
        rows[0],
        "Chat id",
        state.messages.chat_id.value(),
        state.messages.focus == Some(MessageField::ChatId),
    );
    render_field(
        frame,
        rows[1],
        "Text",
        state.messages.text.value(),
        state.messages.focus == Some(MessageField::Text),
    );

    let hint = if state.messages.sending {
        Span::styled("Sending...", Style::default().fg(Color::Yellow))
    } else if state.messages.focus.is_some() {
        Span::styled(
            "Enter to send, Esc to stop editing",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled("Enter to edit", Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(Paragraph::new(Line::from(hint)), rows[2]);
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if focused { "\u{2588}" } else { "" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!("{label:>8}: "), label_style),
            Span::raw(value.to_string()),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ])),
        area,
    );
}
