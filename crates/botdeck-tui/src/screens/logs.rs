//! Logs screen: recent message traffic through the bot.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::{Fetch, truncate_to_width};
use crate::effects::UiEffect;
use crate::state::TuiState;

pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let count = state.logs.data.loaded().map_or(0, Vec::len);
    match key.code {
        KeyCode::Up => state.logs.offset = state.logs.offset.saturating_sub(1),
        KeyCode::Down => {
            if state.logs.offset + 1 < count {
                state.logs.offset += 1;
            }
        }
        KeyCode::PageUp => state.logs.offset = state.logs.offset.saturating_sub(10),
        KeyCode::PageDown => state.logs.offset = (state.logs.offset + 10).min(count.saturating_sub(1)),
        KeyCode::Home => state.logs.offset = 0,
        _ => {}
    }
    vec![]
}

pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Message log ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &state.logs.data {
        Fetch::Idle | Fetch::Loading => {
            frame.render_widget(Paragraph::new("Loading logs..."), inner);
        }
        Fetch::Failed(message) => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("Failed to load logs: {message} (r to retry)"),
                    Style::default().fg(Color::Red),
                )),
                inner,
            );
        }
        Fetch::Loaded(logs) if logs.is_empty() => {
            frame.render_widget(Paragraph::new("No log entries"), inner);
        }
        Fetch::Loaded(logs) => {
            let lines: Vec<Line> = logs
                .iter()
                .skip(state.logs.offset)
                .take(inner.height as usize)
                .map(|entry| {
                    let who = entry
                        .username
                        .as_deref()
                        .map(|u| format!("@{u}"))
                        .or_else(|| entry.first_name.clone())
                        .unwrap_or_else(|| entry.telegram_id.to_string());
                    let (arrow, arrow_style) = if entry.direction == "in" {
                        ("\u{2190}", Style::default().fg(Color::Green))
                    } else {
                        ("\u{2192}", Style::default().fg(Color::Blue))
                    };
                    let text = truncate_to_width(&entry.text, 60);
                    Line::from(vec![
                        Span::styled(
                            format!("{:<17}", truncate_to_width(&entry.created_at, 16)),
                            Style::default().fg(Color::Gray),
                        ),
                        Span::styled(format!("{arrow} "), arrow_style),
                        Span::raw(format!("{who:<20}")),
                        Span::raw(text),
                    ])
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), inner);
        }
    }
}
