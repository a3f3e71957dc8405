//! Settings screen: the bot's key/value configuration.
//!
//! Keys are opaque to the panel. Edits are staged into the loaded map and
//! the whole map is saved in one request, matching the server's
//! replace-all semantics.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::{Fetch, TextField};
use crate::effects::UiEffect;
use crate::state::TuiState;

pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    if state.settings.saving {
        return vec![];
    }

    if let Some(editor) = state.settings.editing.as_mut() {
        match key.code {
            KeyCode::Esc => {
                state.settings.editing = None;
            }
            KeyCode::Enter => {
                let value = editor.value().to_string();
                let key_name = state.settings.selected_key().map(str::to_string);
                if let (Some(key_name), Fetch::Loaded(settings)) =
                    (key_name, &mut state.settings.data)
                {
                    settings.insert(key_name, value);
                }
                state.settings.editing = None;
            }
            KeyCode::Char(c) => editor.insert(c),
            KeyCode::Backspace => editor.backspace(),
            KeyCode::Left => editor.move_left(),
            KeyCode::Right => editor.move_right(),
            KeyCode::Home => editor.move_home(),
            KeyCode::End => editor.move_end(),
            _ => {}
        }
        return vec![];
    }

    match key.code {
        KeyCode::Up => {
            state.settings.selected = state.settings.selected.saturating_sub(1);
            vec![]
        }
        KeyCode::Down => {
            if state.settings.selected + 1 < state.settings.keys.len() {
                state.settings.selected += 1;
            }
            vec![]
        }
        KeyCode::Enter => {
            let current = state
                .settings
                .selected_key()
                .and_then(|key| state.settings.data.loaded().and_then(|s| s.get(key)))
                .cloned();
            if let Some(value) = current {
                let mut editor = TextField::default();
                editor.set(value);
                state.settings.editing = Some(editor);
            }
            vec![]
        }
        KeyCode::Char('s') => {
            let Some(settings) = state.settings.data.loaded() else {
                return vec![];
            };
            state.settings.saving = true;
            vec![UiEffect::SaveSettings {
                settings: settings.clone(),
            }]
        }
        _ => vec![],
    }
}

pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let block = Block::default().title(" Bot settings ").borders(Borders::ALL);
    let inner = block.inner(rows[0]);
    frame.render_widget(block, rows[0]);

    match &state.settings.data {
        Fetch::Idle | Fetch::Loading => {
            frame.render_widget(Paragraph::new("Loading settings..."), inner);
        }
        Fetch::Failed(message) => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("Failed to load settings: {message} (r to retry)"),
                    Style::default().fg(Color::Red),
                )),
                inner,
            );
        }
        Fetch::Loaded(settings) => {
            let lines: Vec<Line> = state
                .settings
                .keys
                .iter()
                .enumerate()
                .take(inner.height as usize)
                .map(|(i, key)| {
                    let selected = i == state.settings.selected;
                    let marker = if selected { "> " } else { "  " };
                    let key_style = if selected {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    let value: Span = match (&state.settings.editing, selected) {
                        (Some(editor), true) => Span::styled(
                            format!("{}\u{2588}", editor.value()),
                            Style::default().fg(Color::Cyan),
                        ),
                        _ => Span::raw(settings.get(key).cloned().unwrap_or_default()),
                    };
                    Line::from(vec![
                        Span::styled(format!("{marker}{key:<28}"), key_style),
                        value,
                    ])
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), inner);
        }
    }

    let hint = if state.settings.saving {
        Span::styled("Saving...", Style::default().fg(Color::Yellow))
    } else if state.settings.editing.is_some() {
        Span::styled(
            "Enter to apply, Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(
            "Enter edit value  s save all",
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(hint)), rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use botdeck_core::api::types::SettingsMap;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state_with_settings() -> TuiState {
        let mut state = TuiState::new();
        let mut settings = SettingsMap::new();
        settings.insert("greeting".to_string(), "hello".to_string());
        settings.insert("rate_limit".to_string(), "30".to_string());
        state.settings.set_settings(settings);
        state
    }

    #[test]
    fn test_edit_commits_into_staged_map() {
        let mut state = state_with_settings();
        // Keys are sorted, so "greeting" is first.
        handle_key(&mut state, press(KeyCode::Enter));
        assert!(state.settings.editing.is_some());

        handle_key(&mut state, press(KeyCode::Char('!')));
        handle_key(&mut state, press(KeyCode::Enter));
        assert!(state.settings.editing.is_none());
        assert_eq!(
            state.settings.data.loaded().unwrap().get("greeting").unwrap(),
            "hello!"
        );
    }

    #[test]
    fn test_save_sends_whole_map() {
        let mut state = state_with_settings();
        let effects = handle_key(&mut state, press(KeyCode::Char('s')));
        match effects.as_slice() {
            [UiEffect::SaveSettings { settings }] => {
                assert_eq!(settings.len(), 2);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
        assert!(state.settings.saving);
    }

    #[test]
    fn test_escape_discards_edit() {
        let mut state = state_with_settings();
        handle_key(&mut state, press(KeyCode::Enter));
        handle_key(&mut state, press(KeyCode::Char('x')));
        handle_key(&mut state, press(KeyCode::Esc));
        assert_eq!(
            state.settings.data.loaded().unwrap().get("greeting").unwrap(),
            "hello"
        );
    }
}
