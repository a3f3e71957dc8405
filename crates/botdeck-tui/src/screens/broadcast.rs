//! Broadcast screen: compose a broadcast and review past deliveries.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::{Fetch, truncate_to_width};
use crate::effects::UiEffect;
use crate::state::TuiState;

pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    if state.broadcast.sending {
        return vec![];
    }

    if state.broadcast.composing {
        return match key.code {
            KeyCode::Esc => {
                state.broadcast.composing = false;
                vec![]
            }
            KeyCode::Enter => {
                let text = state.broadcast.compose.value().trim().to_string();
                if text.is_empty() {
                    state.set_flash("Broadcast text must not be empty", true);
                    return vec![];
                }
                state.broadcast.sending = true;
                vec![UiEffect::SendBroadcast { text }]
            }
            KeyCode::Char(c) => {
                state.broadcast.compose.insert(c);
                vec![]
            }
            KeyCode::Backspace => {
                state.broadcast.compose.backspace();
                vec![]
            }
            KeyCode::Left => {
                state.broadcast.compose.move_left();
                vec![]
            }
            KeyCode::Right => {
                state.broadcast.compose.move_right();
                vec![]
            }
            _ => vec![],
        };
    }

    if key.code == KeyCode::Char('n') {
        state.broadcast.composing = true;
    }
    vec![]
}

pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    render_compose(state, frame, rows[0]);
    render_history(state, frame, rows[1]);
}

fn render_compose(state: &TuiState, frame: &mut Frame, area: Rect) {
    let title = if state.broadcast.sending {
        " New broadcast (sending...) "
    } else if state.broadcast.composing {
        " New broadcast (Enter to send, Esc to cancel) "
    } else {
        " New broadcast (n to compose) "
    };
    let border_style = if state.broadcast.composing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = if state.broadcast.composing { "\u{2588}" } else { "" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(state.broadcast.compose.value().to_string()),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ])),
        inner,
    );
}

fn render_history(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Past broadcasts ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &state.broadcast.history {
        Fetch::Idle | Fetch::Loading => {
            frame.render_widget(Paragraph::new("Loading broadcasts..."), inner);
        }
        Fetch::Failed(message) => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("Failed to load broadcasts: {message} (r to retry)"),
                    Style::default().fg(Color::Red),
                )),
                inner,
            );
        }
        Fetch::Loaded(broadcasts) if broadcasts.is_empty() => {
            frame.render_widget(Paragraph::new("No broadcasts yet"), inner);
        }
        Fetch::Loaded(broadcasts) => {
            let lines: Vec<Line> = broadcasts
                .iter()
                .take(inner.height as usize)
                .map(|b| {
                    let text = truncate_to_width(&b.text, 48);
                    Line::from(vec![
                        Span::styled(
                            format!("{:<12}", truncate_to_width(&b.created_at, 10)),
                            Style::default().fg(Color::Gray),
                        ),
                        Span::raw(format!("{text:<50}")),
                        Span::styled(
                            format!("{} sent, {} failed  ", b.sent_count, b.failed_count),
                            Style::default().fg(Color::Green),
                        ),
                        Span::styled(b.status.clone(), Style::default().fg(Color::Gray)),
                    ])
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), inner);
        }
    }
}
