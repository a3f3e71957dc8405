//! Per-section screens.
//!
//! Each screen module exposes `render` plus a `handle_key` for its
//! section-specific keys. This module dispatches on the active section and
//! owns the fetch plumbing shared by all screens.

pub mod admins;
pub mod auth;
pub mod broadcast;
pub mod dashboard;
pub mod logs;
pub mod messages;
pub mod settings;
pub mod users;

use botdeck_core::roles::Section;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::common::Fetch;
use crate::effects::{SectionQuery, UiEffect};
use crate::events::SectionData;
use crate::state::TuiState;

/// Whether the active screen currently captures plain keystrokes.
pub fn wants_text_input(state: &TuiState) -> bool {
    match state.active {
        Section::Users => state.users.search_focused,
        Section::Messages => state.messages.focus.is_some(),
        Section::Broadcast => state.broadcast.composing,
        Section::Admins => state.admins.form.is_some(),
        Section::Settings => state.settings.editing.is_some(),
        Section::Dashboard | Section::Logs => false,
    }
}

/// Routes a key to the active screen.
pub fn handle_key(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    match state.active {
        Section::Dashboard => vec![],
        Section::Users => users::handle_key(state, key),
        Section::Messages => messages::handle_key(state, key),
        Section::Broadcast => broadcast::handle_key(state, key),
        Section::Logs => logs::handle_key(state, key),
        Section::Admins => admins::handle_key(state, key),
        Section::Settings => settings::handle_key(state, key),
    }
}

/// Marks a section's data loading and returns its fetch query.
///
/// Returns `None` for sections without server-backed data.
pub fn begin_load(state: &mut TuiState, section: Section) -> Option<SectionQuery> {
    match section {
        Section::Dashboard => {
            state.dashboard.data = Fetch::Loading;
            Some(SectionQuery::None)
        }
        Section::Users => {
            state.users.data = Fetch::Loading;
            Some(SectionQuery::Users {
                page: state.users.page,
                search: state.users.search_term(),
            })
        }
        Section::Messages => None,
        Section::Broadcast => {
            state.broadcast.history = Fetch::Loading;
            Some(SectionQuery::None)
        }
        Section::Logs => {
            state.logs.data = Fetch::Loading;
            state.logs.offset = 0;
            Some(SectionQuery::None)
        }
        Section::Admins => {
            state.admins.data = Fetch::Loading;
            Some(SectionQuery::None)
        }
        Section::Settings => {
            state.settings.data = Fetch::Loading;
            Some(SectionQuery::None)
        }
    }
}

/// Stores a completed fetch into the matching screen.
pub fn apply_section_data(state: &mut TuiState, data: SectionData) {
    match data {
        SectionData::Stats(stats) => state.dashboard.data = Fetch::Loaded(stats),
        SectionData::Users(page) => {
            state.users.selected = state
                .users
                .selected
                .min(page.users.len().saturating_sub(1));
            state.users.data = Fetch::Loaded(page);
        }
        SectionData::Broadcasts(broadcasts) => {
            state.broadcast.history = Fetch::Loaded(broadcasts);
        }
        SectionData::Logs(logs) => state.logs.data = Fetch::Loaded(logs),
        SectionData::Admins(admins) => {
            state.admins.selected = state.admins.selected.min(admins.len().saturating_sub(1));
            state.admins.data = Fetch::Loaded(admins);
        }
        SectionData::Settings(settings) => state.settings.set_settings(settings),
    }
}

/// Records a failed fetch on the matching screen.
pub fn mark_section_failed(state: &mut TuiState, section: Section, message: &str) {
    let message = message.to_string();
    match section {
        Section::Dashboard => state.dashboard.data = Fetch::Failed(message),
        Section::Users => state.users.data = Fetch::Failed(message),
        Section::Messages => {}
        Section::Broadcast => state.broadcast.history = Fetch::Failed(message),
        Section::Logs => state.logs.data = Fetch::Failed(message),
        Section::Admins => state.admins.data = Fetch::Failed(message),
        Section::Settings => state.settings.data = Fetch::Failed(message),
    }
}

/// Renders the active screen into the content area.
pub fn render(state: &TuiState, frame: &mut Frame, area: Rect) {
    match state.active {
        Section::Dashboard => dashboard::render(state, frame, area),
        Section::Users => users::render(state, frame, area),
        Section::Messages => messages::render(state, frame, area),
        Section::Broadcast => broadcast::render(state, frame, area),
        Section::Logs => logs::render(state, frame, area),
        Section::Admins => admins::render(state, frame, area),
        Section::Settings => settings::render(state, frame, area),
    }
}
