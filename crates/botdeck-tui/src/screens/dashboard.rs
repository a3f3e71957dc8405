//! Dashboard screen: aggregate bot statistics.

use botdeck_core::api::types::DashboardStats;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::common::Fetch;
use crate::state::TuiState;

pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    match &state.dashboard.data {
        Fetch::Idle | Fetch::Loading => {
            frame.render_widget(Paragraph::new("Loading statistics..."), area);
        }
        Fetch::Failed(message) => {
            let line = Line::from(Span::styled(
                format!("Failed to load statistics: {message} (r to retry)"),
                Style::default().fg(Color::Red),
            ));
            frame.render_widget(Paragraph::new(line), area);
        }
        Fetch::Loaded(stats) => render_stats(stats, frame, area),
    }
}

fn render_stats(stats: &DashboardStats, frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // stat cards
            Constraint::Length(9), // weekly activity
            Constraint::Min(3),    // top commands
        ])
        .split(area);

    render_cards(stats, frame, rows[0]);
    render_activity(stats, frame, rows[1]);
    render_top_commands(stats, frame, rows[2]);
}

fn render_cards(stats: &DashboardStats, frame: &mut Frame, area: Rect) {
    let cards: [(&str, String, &str); 6] = [
        ("Total users", stats.total_users.to_string(), ""),
        (
            "New today",
            stats.new_users_today.to_string(),
            stats.users_change.as_str(),
        ),
        (
            "Messages today",
            stats.messages_today.to_string(),
            stats.messages_change.as_str(),
        ),
        ("Commands today", stats.commands_today.to_string(), ""),
        ("Active sessions", stats.active_sessions.to_string(), ""),
        ("Blocked", stats.blocked_users.to_string(), ""),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, 6); 6])
        .split(area);

    for ((title, value, change), column) in cards.into_iter().zip(columns.iter()) {
        let mut value_line = vec![Span::styled(
            value,
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if !change.is_empty() {
            value_line.push(Span::styled(
                format!(" {change}"),
                Style::default().fg(Color::Green),
            ));
        }
        let card = Paragraph::new(Line::from(value_line))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(card, *column);
    }
}

fn render_activity(stats: &DashboardStats, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Weekly activity ")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if stats.weekly_activity.is_empty() {
        frame.render_widget(Paragraph::new("No activity data"), inner);
        return;
    }

    let max = stats
        .weekly_activity
        .iter()
        .map(|p| p.value)
        .max()
        .unwrap_or(0)
        .max(1);
    let bar_width = inner.width.saturating_sub(18) as u64;

    let lines: Vec<Line> = stats
        .weekly_activity
        .iter()
        .map(|point| {
            let filled = (point.value * bar_width / max) as usize;
            Line::from(vec![
                Span::styled(format!("{:>4} ", point.day), Style::default().fg(Color::Gray)),
                Span::styled("\u{2588}".repeat(filled), Style::default().fg(Color::Cyan)),
                Span::raw(format!(" {}", point.value)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_top_commands(stats: &DashboardStats, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Top commands ")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if stats.top_commands.is_empty() {
        frame.render_widget(Paragraph::new("No command data"), inner);
        return;
    }

    let lines: Vec<Line> = stats
        .top_commands
        .iter()
        .map(|cmd| {
            Line::from(vec![
                Span::styled(
                    format!("{:<16}", cmd.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("{:>8}  ", cmd.count)),
                Span::styled(
                    format!("{:.0}%", cmd.percentage),
                    Style::default().fg(Color::Gray),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
