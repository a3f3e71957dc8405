//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(state, event)`
//! and executes the returned effects. The reducer never performs I/O.

use botdeck_core::roles::Section;
use botdeck_core::session::SessionPhase;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::effects::UiEffect;
use crate::events::{ActionOutcome, SectionData, UiEvent};
use crate::screens;
use crate::state::TuiState;

/// The main reducer function.
pub fn update(state: &mut TuiState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            state.spinner_frame = state.spinner_frame.wrapping_add(1);
            if let Some(flash) = &mut state.flash {
                flash.ticks_left = flash.ticks_left.saturating_sub(1);
                if flash.ticks_left == 0 {
                    state.flash = None;
                }
            }
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(state, term_event),
        UiEvent::SessionResolved { phase, user } => {
            state.phase = phase;
            state.user = user;
            match phase {
                SessionPhase::Authenticated => load_section(state, Section::Dashboard),
                SessionPhase::NeedsSetup | SessionPhase::NeedsLogin => {
                    state.auth.reset();
                    vec![]
                }
                SessionPhase::Checking => vec![],
            }
        }
        UiEvent::AuthCompleted { result } => {
            state.auth.busy = false;
            match result {
                Ok(user) => {
                    state.phase = SessionPhase::Authenticated;
                    state.user = Some(user);
                    state.auth.reset();
                    load_section(state, Section::Dashboard)
                }
                Err(e) => {
                    state.auth.error = Some(e.message);
                    // Keep the login, drop the rejected password.
                    state.auth.password.clear();
                    vec![]
                }
            }
        }
        UiEvent::LoggedOut => {
            enter_login(state, None);
            vec![]
        }
        UiEvent::SessionExpired => {
            enter_login(state, Some("Session expired. Sign in again.".to_string()));
            vec![]
        }
        UiEvent::SectionLoaded {
            section,
            generation,
            result,
        } => handle_section_loaded(state, section, generation, result),
        UiEvent::ActionCompleted { result } => handle_action_completed(state, result),
    }
}

fn enter_login(state: &mut TuiState, error: Option<String>) {
    state.phase = SessionPhase::NeedsLogin;
    state.user = None;
    state.clear_screens();
    state.auth.reset();
    state.auth.error = error;
    state.flash = None;
}

fn handle_section_loaded(
    state: &mut TuiState,
    section: Section,
    generation: u64,
    result: Result<SectionData, botdeck_core::api::ApiError>,
) -> Vec<UiEffect> {
    // A newer fetch has been dispatched since; this result is stale.
    if generation != state.fetch_seq.current() {
        return vec![];
    }
    match result {
        Ok(data) => {
            screens::apply_section_data(state, data);
            vec![]
        }
        Err(e) if e.is_unauthorized() => vec![UiEffect::ForceLogout],
        Err(e) => {
            screens::mark_section_failed(state, section, &e.message);
            vec![]
        }
    }
}

fn handle_action_completed(
    state: &mut TuiState,
    result: Result<ActionOutcome, botdeck_core::api::ApiError>,
) -> Vec<UiEffect> {
    // Whatever happened, the in-flight guard comes off.
    state.messages.sending = false;
    state.broadcast.sending = false;
    state.admins.busy = false;
    state.settings.saving = false;

    match result {
        Ok(outcome) => {
            let (flash, refresh) = match outcome {
                ActionOutcome::UserBlocked { blocked } => (
                    if blocked {
                        "User blocked".to_string()
                    } else {
                        "User unblocked".to_string()
                    },
                    Some(Section::Users),
                ),
                ActionOutcome::BroadcastSent(receipt) => {
                    state.broadcast.compose.clear();
                    state.broadcast.composing = false;
                    (
                        format!(
                            "Broadcast sent: {} delivered, {} failed",
                            receipt.sent_count, receipt.failed_count
                        ),
                        Some(Section::Broadcast),
                    )
                }
                ActionOutcome::MessageSent => {
                    state.messages.text.clear();
                    state.messages.focus = None;
                    ("Message sent".to_string(), None)
                }
                ActionOutcome::SettingsSaved => ("Settings saved".to_string(), None),
                ActionOutcome::AdminCreated(admin) => {
                    state.admins.form = None;
                    (format!("Administrator {} created", admin.login), Some(Section::Admins))
                }
                ActionOutcome::AdminToggled => ("Administrator updated".to_string(), Some(Section::Admins)),
            };
            state.set_flash(flash, false);
            match refresh {
                Some(section) if section == state.active => load_section(state, section),
                _ => vec![],
            }
        }
        Err(e) if e.is_unauthorized() => vec![UiEffect::ForceLogout],
        Err(e) => {
            state.set_flash(e.message, true);
            vec![]
        }
    }
}

fn handle_terminal_event(state: &mut TuiState, event: Event) -> Vec<UiEffect> {
    let Event::Key(key) = event else {
        return vec![];
    };
    if matches!(key.kind, KeyEventKind::Release) {
        return vec![];
    }

    // Ctrl+C quits from any phase.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return vec![UiEffect::Quit];
    }

    match state.phase {
        SessionPhase::Checking => vec![],
        SessionPhase::NeedsSetup | SessionPhase::NeedsLogin => {
            screens::auth::handle_key(state, key)
        }
        SessionPhase::Authenticated => handle_key_authenticated(state, key),
    }
}

fn handle_key_authenticated(state: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    // Modifier-based globals work even while a field captures input.
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('l') => return vec![UiEffect::Logout],
            KeyCode::Char('r') => return load_section(state, state.active),
            _ => {}
        }
    }
    match key.code {
        KeyCode::Tab => return cycle_section(state, 1),
        KeyCode::BackTab => return cycle_section(state, -1),
        _ => {}
    }

    // An active text field gets everything else.
    if screens::wants_text_input(state) {
        return screens::handle_key(state, key);
    }

    match key.code {
        KeyCode::Char('q') => vec![UiEffect::Quit],
        KeyCode::Char('r') => load_section(state, state.active),
        KeyCode::Char(c @ '1'..='9') => {
            let index = (c as usize) - ('1' as usize);
            match state.sections().get(index) {
                Some(&section) => switch_section(state, section),
                None => vec![],
            }
        }
        _ => screens::handle_key(state, key),
    }
}

fn cycle_section(state: &mut TuiState, step: isize) -> Vec<UiEffect> {
    let sections = state.sections();
    if sections.is_empty() {
        return vec![];
    }
    let current = sections
        .iter()
        .position(|&s| s == state.active)
        .unwrap_or(0);
    let len = sections.len() as isize;
    let next = (current as isize + step).rem_euclid(len) as usize;
    switch_section(state, sections[next])
}

/// Switches the active section, re-checking the role gate.
///
/// The sidebar never offers a forbidden section, but shortcuts are
/// rejected here too so gating does not depend on what was rendered.
pub fn switch_section(state: &mut TuiState, section: Section) -> Vec<UiEffect> {
    let Some(role) = state.role() else {
        return vec![];
    };
    if !section.allowed_for(role) {
        state.set_flash("That section requires the owner role", true);
        return vec![];
    }
    state.active = section;
    load_section(state, section)
}

/// Marks the section loading and emits its fetch effect.
pub fn load_section(state: &mut TuiState, section: Section) -> Vec<UiEffect> {
    let query = match screens::begin_load(state, section) {
        Some(query) => query,
        // Nothing to fetch for this section.
        None => return vec![],
    };
    let generation = state.fetch_seq.next();
    vec![UiEffect::LoadSection {
        section,
        generation,
        query,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Fetch;
    use botdeck_core::api::ApiError;
    use botdeck_core::api::types::{BroadcastReceipt, DashboardStats, PanelUser};
    use botdeck_core::roles::Role;

    fn owner() -> PanelUser {
        PanelUser {
            id: 1,
            login: "root".to_string(),
            display_name: "Root".to_string(),
            role: Role::Owner,
        }
    }

    fn admin() -> PanelUser {
        PanelUser {
            id: 2,
            login: "alice".to_string(),
            display_name: "Alice".to_string(),
            role: Role::Admin,
        }
    }

    fn stats() -> DashboardStats {
        serde_json::from_value(serde_json::json!({
            "totalUsers": 5, "newUsersToday": 1, "messagesToday": 9,
            "commandsToday": 2, "activeSessions": 1, "blockedUsers": 0
        }))
        .unwrap()
    }

    fn authenticated_state(user: PanelUser) -> TuiState {
        let mut state = TuiState::new();
        update(
            &mut state,
            UiEvent::SessionResolved {
                phase: SessionPhase::Authenticated,
                user: Some(user),
            },
        );
        state
    }

    fn key(code: KeyCode) -> UiEvent {
        UiEvent::Terminal(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn test_resolved_authenticated_loads_dashboard() {
        let mut state = TuiState::new();
        let effects = update(
            &mut state,
            UiEvent::SessionResolved {
                phase: SessionPhase::Authenticated,
                user: Some(owner()),
            },
        );
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::LoadSection {
                section: Section::Dashboard,
                ..
            }]
        ));
        assert!(state.dashboard.data.is_loading());
    }

    #[test]
    fn test_stale_section_result_is_discarded() {
        let mut state = authenticated_state(owner());
        let stale = state.fetch_seq.current();
        // A reload bumps the generation past the in-flight fetch.
        update(&mut state, key(KeyCode::Char('r')));

        let effects = update(
            &mut state,
            UiEvent::SectionLoaded {
                section: Section::Dashboard,
                generation: stale,
                result: Ok(SectionData::Stats(stats())),
            },
        );
        assert!(effects.is_empty());
        assert!(state.dashboard.data.is_loading());
    }

    #[test]
    fn test_current_section_result_is_applied() {
        let mut state = authenticated_state(owner());
        let generation = state.fetch_seq.current();
        update(
            &mut state,
            UiEvent::SectionLoaded {
                section: Section::Dashboard,
                generation,
                result: Ok(SectionData::Stats(stats())),
            },
        );
        assert_eq!(state.dashboard.data.loaded().unwrap().total_users, 5);
    }

    #[test]
    fn test_unauthorized_fetch_forces_logout() {
        let mut state = authenticated_state(owner());
        let generation = state.fetch_seq.current();
        let effects = update(
            &mut state,
            UiEvent::SectionLoaded {
                section: Section::Dashboard,
                generation,
                result: Err(ApiError::unauthorized("Session expired")),
            },
        );
        assert!(matches!(effects.as_slice(), [UiEffect::ForceLogout]));
        // The screen shows no error; the forced logout replaces it.
        assert!(!matches!(state.dashboard.data, Fetch::Failed(_)));
    }

    #[test]
    fn test_session_expired_returns_to_login_with_message() {
        let mut state = authenticated_state(owner());
        update(&mut state, UiEvent::SessionExpired);
        assert_eq!(state.phase, SessionPhase::NeedsLogin);
        assert!(state.user.is_none());
        assert!(state.auth.error.as_deref().unwrap().contains("expired"));
    }

    #[test]
    fn test_admin_cannot_jump_to_admin_section() {
        let mut state = authenticated_state(admin());
        // Digit 6 would be Admins for an owner; for an admin the visible
        // list skips it, so 6 lands on Settings.
        update(&mut state, key(KeyCode::Char('6')));
        assert_eq!(state.active, Section::Settings);

        // Direct switch is rejected by the role gate.
        let effects = switch_section(&mut state, Section::Admins);
        assert!(effects.is_empty());
        assert_ne!(state.active, Section::Admins);
        assert!(state.flash.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_tab_cycles_through_visible_sections() {
        let mut state = authenticated_state(admin());
        update(&mut state, key(KeyCode::Tab));
        assert_eq!(state.active, Section::Users);
        update(&mut state, key(KeyCode::BackTab));
        assert_eq!(state.active, Section::Dashboard);
        // Wraps from the first to the last visible section.
        update(&mut state, key(KeyCode::BackTab));
        assert_eq!(state.active, Section::Settings);
    }

    #[test]
    fn test_auth_failure_shows_message_and_clears_password() {
        let mut state = TuiState::new();
        update(
            &mut state,
            UiEvent::SessionResolved {
                phase: SessionPhase::NeedsLogin,
                user: None,
            },
        );
        state.auth.login.set("alice");
        state.auth.password.set("wrongpass");
        state.auth.busy = true;

        update(
            &mut state,
            UiEvent::AuthCompleted {
                result: Err(ApiError::auth("Invalid credentials")),
            },
        );
        assert!(!state.auth.busy);
        assert_eq!(state.auth.error.as_deref(), Some("Invalid credentials"));
        assert!(state.auth.password.is_empty());
        assert_eq!(state.auth.login.value(), "alice");
    }

    #[test]
    fn test_broadcast_receipt_flashes_and_refreshes() {
        let mut state = authenticated_state(owner());
        update(&mut state, key(KeyCode::Char('4')));
        assert_eq!(state.active, Section::Broadcast);

        let receipt = BroadcastReceipt {
            broadcast_id: 7,
            sent_count: 12,
            failed_count: 1,
            status: "completed".to_string(),
        };
        let effects = update(
            &mut state,
            UiEvent::ActionCompleted {
                result: Ok(ActionOutcome::BroadcastSent(receipt)),
            },
        );
        assert!(state.flash.as_ref().unwrap().text.contains("12 delivered"));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::LoadSection {
                section: Section::Broadcast,
                ..
            }]
        ));
    }
}
