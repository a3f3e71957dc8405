//! Pure view functions for the panel.
//!
//! Functions here take `&TuiState` by immutable reference and draw to a
//! ratatui frame. No mutations, no side effects.

use botdeck_core::session::SessionPhase;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::screens;
use crate::state::TuiState;

const SIDEBAR_WIDTH: u16 = 20;
const HEADER_HEIGHT: u16 = 1;
const STATUS_HEIGHT: u16 = 1;

/// Spinner frames for the checking splash and status line.
const SPINNER_FRAMES: &[&str] = &["\u{25d0}", "\u{25d3}", "\u{25d1}", "\u{25d2}"];

/// Renders the entire panel to the frame.
pub fn render(state: &TuiState, frame: &mut Frame) {
    let area = frame.area();
    match state.phase {
        SessionPhase::Checking => render_checking(state, frame, area),
        SessionPhase::NeedsSetup | SessionPhase::NeedsLogin => {
            screens::auth::render(state, frame, area);
        }
        SessionPhase::Authenticated => render_panel(state, frame, area),
    }
}

fn render_checking(state: &TuiState, frame: &mut Frame, area: Rect) {
    let spinner = SPINNER_FRAMES[state.spinner_frame % SPINNER_FRAMES.len()];
    let line = Line::from(vec![
        Span::styled(format!("{spinner} "), Style::default().fg(Color::Cyan)),
        Span::raw("Checking session..."),
    ]);
    let vertical_center = Rect {
        y: area.y + area.height / 2,
        height: 1,
        ..area
    };
    frame.render_widget(
        Paragraph::new(line).alignment(Alignment::Center),
        vertical_center,
    );
}

fn render_panel(state: &TuiState, frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(area);

    render_header(state, frame, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
        .split(rows[1]);
    render_sidebar(state, frame, columns[0]);
    screens::render(state, frame, columns[1]);

    render_status(state, frame, rows[2]);
}

fn render_header(state: &TuiState, frame: &mut Frame, area: Rect) {
    let operator = state
        .user
        .as_ref()
        .map(|u| format!("{} ({})", u.display_name, u.role.display_name()))
        .unwrap_or_default();
    let line = Line::from(vec![
        Span::styled(
            " botdeck ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} ", state.active.title())),
        Span::styled(
            format!("{operator:>width$}", width = (area.width as usize).saturating_sub(12 + state.active.title().len())),
            Style::default().fg(Color::Gray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_sidebar(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::RIGHT);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = state
        .sections()
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let active = *section == state.active;
            let style = if active {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let marker = if active { "\u{258c}" } else { " " };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(format!("{} {}", i + 1, section.title()), style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status(state: &TuiState, frame: &mut Frame, area: Rect) {
    let line = if let Some(flash) = &state.flash {
        let style = if flash.is_error {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        Line::from(Span::styled(format!(" {}", flash.text), style))
    } else {
        Line::from(Span::styled(
            " Tab section  r reload  Ctrl+L sign out  q quit",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}
