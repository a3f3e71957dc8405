//! Users screen: paginated bot user directory with search and blocking.

use botdeck_core::roles::Section;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::Fetch;
use crate::effects::UiEffect;
use crate::state::{MessageField, TuiState};
use crate::update;

pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    if state.users.search_focused {
        return handle_search_key(state, key);
    }

    match key.code {
        KeyCode::Char('/') => {
            state.users.search_focused = true;
            vec![]
        }
        KeyCode::Up => {
            state.users.selected = state.users.selected.saturating_sub(1);
            vec![]
        }
        KeyCode::Down => {
            let count = state
                .users
                .data
                .loaded()
                .map_or(0, |page| page.users.len());
            if state.users.selected + 1 < count {
                state.users.selected += 1;
            }
            vec![]
        }
        KeyCode::Left | KeyCode::Char('p') => {
            if state.users.page > 1 {
                state.users.page -= 1;
                return update::load_section(state, Section::Users);
            }
            vec![]
        }
        KeyCode::Right | KeyCode::Char('n') => {
            let pages = state.users.data.loaded().map_or(1, |page| page.pages);
            if state.users.page < pages.max(1) {
                state.users.page += 1;
                return update::load_section(state, Section::Users);
            }
            vec![]
        }
        KeyCode::Char('b') => {
            let Some(user) = selected_user(state) else {
                return vec![];
            };
            vec![UiEffect::BlockUser {
                telegram_id: user.0,
                blocked: !user.1,
            }]
        }
        // Jump to the Messages screen with the selected user prefilled.
        KeyCode::Char('m') => {
            let Some((telegram_id, _)) = selected_user(state) else {
                return vec![];
            };
            state.messages.chat_id.set(telegram_id.to_string());
            state.messages.focus = Some(MessageField::Text);
            update::switch_section(state, Section::Messages)
        }
        _ => vec![],
    }
}

fn handle_search_key(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    match key.code {
        KeyCode::Enter => {
            state.users.search_focused = false;
            state.users.page = 1;
            state.users.selected = 0;
            update::load_section(state, Section::Users)
        }
        KeyCode::Esc => {
            state.users.search_focused = false;
            if !state.users.search.is_empty() {
                state.users.search.clear();
                state.users.page = 1;
                return update::load_section(state, Section::Users);
            }
            vec![]
        }
        KeyCode::Char(c) => {
            state.users.search.insert(c);
            vec![]
        }
        KeyCode::Backspace => {
            state.users.search.backspace();
            vec![]
        }
        KeyCode::Left => {
            state.users.search.move_left();
            vec![]
        }
        KeyCode::Right => {
            state.users.search.move_right();
            vec![]
        }
        _ => vec![],
    }
}

fn selected_user(state: &TuiState) -> Option<(i64, bool)> {
    let page = state.users.data.loaded()?;
    let user = page.users.get(state.users.selected)?;
    Some((user.telegram_id, user.is_blocked))
}

pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let search_style = if state.users.search_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    let search_cursor = if state.users.search_focused { "\u{2588}" } else { "" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Search: ", search_style),
            Span::raw(state.users.search.value().to_string()),
            Span::styled(search_cursor, Style::default().fg(Color::Cyan)),
        ])),
        rows[0],
    );

    match &state.users.data {
        Fetch::Idle | Fetch::Loading => {
            frame.render_widget(Paragraph::new("Loading users..."), rows[1]);
        }
        Fetch::Failed(message) => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("Failed to load users: {message} (r to retry)"),
                    Style::default().fg(Color::Red),
                )),
                rows[1],
            );
        }
        Fetch::Loaded(page) => {
            let block = Block::default()
                .title(format!(" Users ({} total) ", page.total))
                .borders(Borders::ALL);
            let inner = block.inner(rows[1]);
            frame.render_widget(block, rows[1]);

            let visible = inner.height as usize;
            let start = state.users.selected.saturating_sub(visible.saturating_sub(1));
            let lines: Vec<Line> = page
                .users
                .iter()
                .enumerate()
                .skip(start)
                .take(visible)
                .map(|(i, user)| {
                    let marker = if i == state.users.selected { "> " } else { "  " };
                    let status = if user.is_blocked { "blocked" } else { "active" };
                    let status_style = if user.is_blocked {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default().fg(Color::Green)
                    };
                    let row_style = if i == state.users.selected {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    Line::from(vec![
                        Span::styled(format!("{marker}{:<24}", user.label()), row_style),
                        Span::raw(format!("{:<14}", user.telegram_id)),
                        Span::styled(format!("{status:<9}"), status_style),
                        Span::styled(
                            format!("joined {}", user.joined_at),
                            Style::default().fg(Color::Gray),
                        ),
                    ])
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), inner);
        }
    }

    let pages = state.users.data.loaded().map_or(1, |p| p.pages.max(1));
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(
                "page {}/{pages}  \u{2190}/\u{2192} page  / search  b block/unblock  m message",
                state.users.page
            ),
            Style::default().fg(Color::DarkGray),
        )),
        rows[2],
    );
}
