//! Administrators screen (owner only).
//!
//! Lists administrator accounts, creates new ones, and toggles existing
//! accounts between active and disabled. Reachability is enforced by the
//! role gate in the reducer; this module assumes an owner is signed in.

use botdeck_core::session::MIN_PASSWORD_LEN;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::{Fetch, TextField};
use crate::effects::UiEffect;
use crate::state::{AdminField, AdminForm, TuiState};

pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    if state.admins.busy {
        return vec![];
    }
    if state.admins.form.is_some() {
        return handle_form_key(state, key);
    }

    match key.code {
        KeyCode::Char('n') => {
            state.admins.form = Some(AdminForm::default());
            vec![]
        }
        KeyCode::Up => {
            state.admins.selected = state.admins.selected.saturating_sub(1);
            vec![]
        }
        KeyCode::Down => {
            let count = state.admins.data.loaded().map_or(0, Vec::len);
            if state.admins.selected + 1 < count {
                state.admins.selected += 1;
            }
            vec![]
        }
        KeyCode::Char('t') => {
            let Some(admins) = state.admins.data.loaded() else {
                return vec![];
            };
            let Some(admin) = admins.get(state.admins.selected) else {
                return vec![];
            };
            // The owner account itself cannot be disabled.
            if admin.role.can_manage_admins() {
                state.set_flash("The owner account cannot be disabled", true);
                return vec![];
            }
            state.admins.busy = true;
            vec![UiEffect::ToggleAdmin {
                admin_id: admin.id,
                active: !admin.is_active,
            }]
        }
        _ => vec![],
    }
}

fn handle_form_key(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let order = [AdminField::Login, AdminField::Password, AdminField::DisplayName];
    let Some(form) = state.admins.form.as_mut() else {
        return vec![];
    };
    let position = order.iter().position(|&f| f == form.focus).unwrap_or(0);

    match key.code {
        KeyCode::Esc => {
            state.admins.form = None;
            vec![]
        }
        KeyCode::Tab | KeyCode::Down => {
            form.focus = order[(position + 1) % order.len()];
            vec![]
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.focus = order[(position + order.len() - 1) % order.len()];
            vec![]
        }
        KeyCode::Enter => {
            if position + 1 < order.len() {
                form.focus = order[position + 1];
                return vec![];
            }
            submit_form(state)
        }
        _ => {
            let field = match form.focus {
                AdminField::Login => &mut form.login,
                AdminField::Password => &mut form.password,
                AdminField::DisplayName => &mut form.display_name,
            };
            edit_field(field, key);
            vec![]
        }
    }
}

fn submit_form(state: &mut TuiState) -> Vec<UiEffect> {
    let Some(form) = state.admins.form.as_ref() else {
        return vec![];
    };
    let login = form.login.value().trim().to_string();
    let password = form.password.value().to_string();
    let display_name = form.display_name.value().trim().to_string();

    if login.is_empty() {
        state.set_flash("Login must not be empty", true);
        return vec![];
    }
    if password.len() < MIN_PASSWORD_LEN {
        state.set_flash(
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            true,
        );
        return vec![];
    }

    let display_name = if display_name.is_empty() {
        login.clone()
    } else {
        display_name
    };
    state.admins.busy = true;
    vec![UiEffect::CreateAdmin {
        login,
        password,
        display_name,
    }]
}

fn edit_field(field: &mut TextField, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => field.insert(c),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Left => field.move_left(),
        KeyCode::Right => field.move_right(),
        _ => {}
    }
}

pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    let constraints = if state.admins.form.is_some() {
        [Constraint::Min(3), Constraint::Length(6)]
    } else {
        [Constraint::Min(3), Constraint::Length(1)]
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_list(state, frame, rows[0]);
    if state.admins.form.is_some() {
        render_form(state, frame, rows[1]);
    } else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "n new administrator  t enable/disable",
                Style::default().fg(Color::DarkGray),
            )),
            rows[1],
        );
    }
}

fn render_list(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Administrators ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &state.admins.data {
        Fetch::Idle | Fetch::Loading => {
            frame.render_widget(Paragraph::new("Loading administrators..."), inner);
        }
        Fetch::Failed(message) => {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("Failed to load administrators: {message} (r to retry)"),
                    Style::default().fg(Color::Red),
                )),
                inner,
            );
        }
        Fetch::Loaded(admins) => {
            let lines: Vec<Line> = admins
                .iter()
                .enumerate()
                .take(inner.height as usize)
                .map(|(i, admin)| {
                    let marker = if i == state.admins.selected { "> " } else { "  " };
                    let row_style = if i == state.admins.selected {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    let (status, status_style) = if admin.is_active {
                        ("active", Style::default().fg(Color::Green))
                    } else {
                        ("disabled", Style::default().fg(Color::Red))
                    };
                    let last_login = admin.last_login_at.as_deref().unwrap_or("never");
                    Line::from(vec![
                        Span::styled(format!("{marker}{:<16}", admin.login), row_style),
                        Span::raw(format!("{:<20}", admin.display_name)),
                        Span::styled(
                            format!("{:<7}", admin.role.display_name()),
                            Style::default().fg(Color::Magenta),
                        ),
                        Span::styled(format!("{status:<10}"), status_style),
                        Span::styled(
                            format!("last login {last_login}"),
                            Style::default().fg(Color::Gray),
                        ),
                    ])
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), inner);
        }
    }
}

fn render_form(state: &TuiState, frame: &mut Frame, area: Rect) {
    let Some(form) = &state.admins.form else {
        return;
    };
    let title = if state.admins.busy {
        " New administrator (creating...) "
    } else {
        " New administrator (Enter to submit, Esc to cancel) "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let masked = "\u{2022}".repeat(form.password.value().chars().count());
    let field_line = |label: &str, value: &str, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let cursor = if focused { "\u{2588}" } else { "" };
        Line::from(vec![
            Span::styled(format!("{label:>13}: "), style),
            Span::raw(value.to_string()),
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
        ])
    };
    let lines = vec![
        field_line("Login", form.login.value(), form.focus == AdminField::Login),
        field_line("Password", &masked, form.focus == AdminField::Password),
        field_line(
            "Display name",
            form.display_name.value(),
            form.focus == AdminField::DisplayName,
        ),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use botdeck_core::api::types::AdminAccount;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn admins() -> Vec<AdminAccount> {
        serde_json::from_value(serde_json::json!([
            {"id": 1, "login": "root", "displayName": "Root", "role": "owner",
             "isActive": true, "createdAt": null, "lastLoginAt": null},
            {"id": 2, "login": "alice", "displayName": "Alice", "role": "admin",
             "isActive": true, "createdAt": null, "lastLoginAt": null}
        ]))
        .unwrap()
    }

    #[test]
    fn test_toggle_skips_owner_account() {
        let mut state = TuiState::new();
        state.admins.data = Fetch::Loaded(admins());
        state.admins.selected = 0;
        let effects = handle_key(&mut state, press(KeyCode::Char('t')));
        assert!(effects.is_empty());
        assert!(state.flash.as_ref().unwrap().is_error);

        state.admins.selected = 1;
        let effects = handle_key(&mut state, press(KeyCode::Char('t')));
        // Alice is active, so the toggle requests deactivation.
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::ToggleAdmin {
                admin_id: 2,
                active: false
            }]
        ));
        assert!(state.admins.busy);
    }

    #[test]
    fn test_toggle_requests_reactivation_for_disabled_admin() {
        let mut state = TuiState::new();
        let mut list = admins();
        list[1] = serde_json::from_value(serde_json::json!(
            {"id": 2, "login": "alice", "displayName": "Alice", "role": "admin",
             "isActive": false, "createdAt": null, "lastLoginAt": null}
        ))
        .unwrap();
        state.admins.data = Fetch::Loaded(list);
        state.admins.selected = 1;

        let effects = handle_key(&mut state, press(KeyCode::Char('t')));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::ToggleAdmin {
                admin_id: 2,
                active: true
            }]
        ));
    }

    #[test]
    fn test_create_form_fills_display_name_from_login() {
        let mut state = TuiState::new();
        handle_key(&mut state, press(KeyCode::Char('n')));
        assert!(state.admins.form.is_some());

        for c in "bob".chars() {
            handle_key(&mut state, press(KeyCode::Char(c)));
        }
        handle_key(&mut state, press(KeyCode::Enter));
        for c in "secret1".chars() {
            handle_key(&mut state, press(KeyCode::Char(c)));
        }
        handle_key(&mut state, press(KeyCode::Enter));
        // Display name left empty; Enter on the last field submits.
        let effects = handle_key(&mut state, press(KeyCode::Enter));
        match effects.as_slice() {
            [UiEffect::CreateAdmin {
                login,
                password,
                display_name,
            }] => {
                assert_eq!(login, "bob");
                assert_eq!(password, "secret1");
                assert_eq!(display_name, "bob");
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_short_password_keeps_form_open() {
        let mut state = TuiState::new();
        state.admins.form = Some(AdminForm::default());
        if let Some(form) = state.admins.form.as_mut() {
            form.login.set("bob");
            form.password.set("abc");
            form.focus = AdminField::DisplayName;
        }
        let effects = handle_key(&mut state, press(KeyCode::Enter));
        assert!(effects.is_empty());
        assert!(state.admins.form.is_some());
        assert!(!state.admins.busy);
    }
}
