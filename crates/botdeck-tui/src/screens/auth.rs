//! Sign-in and owner setup form.
//!
//! One form serves both phases. During setup an extra display name field
//! is shown and submission registers the owner instead of signing in.

use botdeck_core::session::{MIN_PASSWORD_LEN, SessionPhase};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::TextField;
use crate::effects::UiEffect;
use crate::state::{AuthField, TuiState};

fn is_setup(state: &TuiState) -> bool {
    state.phase == SessionPhase::NeedsSetup
}

fn fields(setup: bool) -> &'static [AuthField] {
    if setup {
        &[AuthField::Login, AuthField::Password, AuthField::DisplayName]
    } else {
        &[AuthField::Login, AuthField::Password]
    }
}

pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    if state.auth.busy {
        return vec![];
    }
    let setup = is_setup(state);
    let order = fields(setup);
    let focus = state.auth.focus.unwrap_or(AuthField::Login);
    let position = order.iter().position(|&f| f == focus).unwrap_or(0);

    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            state.auth.focus = Some(order[(position + 1) % order.len()]);
            vec![]
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.auth.focus = Some(order[(position + order.len() - 1) % order.len()]);
            vec![]
        }
        KeyCode::Enter => {
            if position + 1 < order.len() {
                state.auth.focus = Some(order[position + 1]);
                return vec![];
            }
            submit(state, setup)
        }
        KeyCode::Esc => {
            state.auth.error = None;
            vec![]
        }
        _ => {
            edit_field(field_mut(state, focus), key);
            vec![]
        }
    }
}

fn submit(state: &mut TuiState, setup: bool) -> Vec<UiEffect> {
    let login = state.auth.login.value().trim().to_string();
    let password = state.auth.password.value().to_string();

    // Mirror the server rules so obvious mistakes never leave the form.
    if login.is_empty() {
        state.auth.error = Some("Login must not be empty".to_string());
        return vec![];
    }
    if password.len() < MIN_PASSWORD_LEN {
        state.auth.error = Some(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
        return vec![];
    }

    state.auth.error = None;
    state.auth.busy = true;
    if setup {
        let display_name = state.auth.display_name.value().trim().to_string();
        vec![UiEffect::SubmitSetup {
            login,
            password,
            display_name,
        }]
    } else {
        vec![UiEffect::SubmitLogin { login, password }]
    }
}

fn field_mut(state: &mut TuiState, field: AuthField) -> &mut TextField {
    match field {
        AuthField::Login => &mut state.auth.login,
        AuthField::Password => &mut state.auth.password,
        AuthField::DisplayName => &mut state.auth.display_name,
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
    let setup = is_setup(state);
    let title = if setup {
        " Create owner account "
    } else {
        " Sign in "
    };

    let form_height = if setup { 12 } else { 10 };
    let form_area = centered_rect(area, 44, form_height);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(block, form_area);

    let inner = form_area.inner(ratatui::layout::Margin {
        horizontal: 2,
        vertical: 1,
    });
    let mut constraints = vec![
        Constraint::Length(2), // login
        Constraint::Length(2), // password
    ];
    if setup {
        constraints.push(Constraint::Length(2)); // display name
    }
    constraints.push(Constraint::Length(1)); // status line
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let focus = state.auth.focus.unwrap_or(AuthField::Login);
    render_field(frame, rows[0], "Login", state.auth.login.value(), focus == AuthField::Login);
    let masked = "\u{2022}".repeat(state.auth.password.value().chars().count());
    render_field(frame, rows[1], "Password", &masked, focus == AuthField::Password);
    if setup {
        render_field(
            frame,
            rows[2],
            "Display name",
            state.auth.display_name.value(),
            focus == AuthField::DisplayName,
        );
    }

    let status_row = rows[rows.len() - 1];
    let status = if state.auth.busy {
        Line::from(Span::styled("Signing in...", Style::default().fg(Color::Yellow)))
    } else if let Some(error) = &state.auth.error {
        Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
    } else {
        Line::from(Span::styled(
            "Enter to submit, Tab to move",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(status).alignment(Alignment::Center), status_row);
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if focused { "\u{2588}" } else { "" };
    let line = Line::from(vec![
        Span::styled(format!("{label:>13}: "), label_style),
        Span::raw(value.to_string()),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}
