//! Application state composition.
//!
//! `TuiState` is the single state tree the reducer mutates and the render
//! functions read. It mirrors the session phase from the core layer and
//! holds per-section screen state.

use botdeck_core::api::types::{
    AdminAccount, Broadcast, DashboardStats, LogEntry, PanelUser, SettingsMap, UsersPage,
};
use botdeck_core::roles::{Role, Section, visible_sections};
use botdeck_core::session::SessionPhase;

use crate::common::{Fetch, FetchSeq, TextField};

/// How many ticks a flash message stays visible (ticks are ~100ms idle).
const FLASH_TICKS: u16 = 40;

/// Transient status message shown in the status bar.
#[derive(Debug, Clone)]
pub struct Flash {
    pub text: String,
    pub is_error: bool,
    pub ticks_left: u16,
}

/// Which auth form field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Login,
    Password,
    DisplayName,
}

/// Sign-in / owner setup form state.
///
/// The same form backs both phases; the display name field is only shown
/// (and submitted) during setup.
#[derive(Debug, Default)]
pub struct AuthFormState {
    pub login: TextField,
    pub password: TextField,
    pub display_name: TextField,
    pub focus: Option<AuthField>,
    pub error: Option<String>,
    /// An auth request is in flight; submissions are ignored until it
    /// completes.
    pub busy: bool,
}

impl AuthFormState {
    pub fn reset(&mut self) {
        self.login.clear();
        self.password.clear();
        self.display_name.clear();
        self.focus = Some(AuthField::Login);
        self.error = None;
        self.busy = false;
    }
}

#[derive(Debug, Default)]
pub struct DashboardScreen {
    pub data: Fetch<DashboardStats>,
}

#[derive(Debug)]
pub struct UsersScreen {
    pub data: Fetch<UsersPage>,
    /// Current page, 1-based to match the server.
    pub page: u32,
    pub search: TextField,
    pub search_focused: bool,
    pub selected: usize,
}

impl Default for UsersScreen {
    fn default() -> Self {
        Self {
            data: Fetch::default(),
            page: 1,
            search: TextField::default(),
            search_focused: false,
            selected: 0,
        }
    }
}

impl UsersScreen {
    pub fn search_term(&self) -> Option<String> {
        let term = self.search.value().trim();
        if term.is_empty() {
            None
        } else {
            Some(term.to_string())
        }
    }
}

/// Which direct-message field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageField {
    ChatId,
    Text,
}

#[derive(Debug, Default)]
pub struct MessagesScreen {
    pub chat_id: TextField,
    pub text: TextField,
    /// `None` while navigating; `Some` while a field captures input.
    pub focus: Option<MessageField>,
    pub sending: bool,
}

#[derive(Debug, Default)]
pub struct BroadcastScreen {
    pub history: Fetch<Vec<Broadcast>>,
    pub compose: TextField,
    pub composing: bool,
    pub sending: bool,
}

#[derive(Debug, Default)]
pub struct LogsScreen {
    pub data: Fetch<Vec<LogEntry>>,
    pub offset: usize,
}

/// Which admin creation form field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminField {
    Login,
    Password,
    DisplayName,
}

#[derive(Debug)]
pub struct AdminForm {
    pub login: TextField,
    pub password: TextField,
    pub display_name: TextField,
    pub focus: AdminField,
}

impl Default for AdminForm {
    fn default() -> Self {
        Self {
            login: TextField::default(),
            password: TextField::default(),
            display_name: TextField::default(),
            focus: AdminField::Login,
        }
    }
}

#[derive(Debug, Default)]
pub struct AdminsScreen {
    pub data: Fetch<Vec<AdminAccount>>,
    pub selected: usize,
    pub form: Option<AdminForm>,
    pub busy: bool,
}

#[derive(Debug, Default)]
pub struct SettingsScreen {
    pub data: Fetch<SettingsMap>,
    /// Sorted keys, derived from `data` on load so rendering is stable.
    pub keys: Vec<String>,
    pub selected: usize,
    /// Editor for the selected key's value, when editing.
    pub editing: Option<TextField>,
    pub saving: bool,
}

impl SettingsScreen {
    pub fn set_settings(&mut self, settings: SettingsMap) {
        let mut keys: Vec<String> = settings.keys().cloned().collect();
        keys.sort();
        self.keys = keys;
        self.selected = self.selected.min(self.keys.len().saturating_sub(1));
        self.editing = None;
        self.data = Fetch::Loaded(settings);
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.keys.get(self.selected).map(String::as_str)
    }
}

/// TUI application state.
pub struct TuiState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// Mirror of the session phase owned by the core session manager.
    pub phase: SessionPhase,
    /// Signed-in operator, present only while authenticated.
    pub user: Option<PanelUser>,
    /// Sign-in / setup form.
    pub auth: AuthFormState,
    /// Currently selected section.
    pub active: Section,
    /// Generation counter for section fetches.
    pub fetch_seq: FetchSeq,
    pub dashboard: DashboardScreen,
    pub users: UsersScreen,
    pub messages: MessagesScreen,
    pub broadcast: BroadcastScreen,
    pub logs: LogsScreen,
    pub admins: AdminsScreen,
    pub settings: SettingsScreen,
    /// Transient status message.
    pub flash: Option<Flash>,
    /// Spinner animation frame counter.
    pub spinner_frame: usize,
}

impl TuiState {
    pub fn new() -> Self {
        let auth = AuthFormState {
            focus: Some(AuthField::Login),
            ..AuthFormState::default()
        };
        Self {
            should_quit: false,
            phase: SessionPhase::Checking,
            user: None,
            auth,
            active: Section::Dashboard,
            fetch_seq: FetchSeq::default(),
            dashboard: DashboardScreen::default(),
            users: UsersScreen::default(),
            messages: MessagesScreen::default(),
            broadcast: BroadcastScreen::default(),
            logs: LogsScreen::default(),
            admins: AdminsScreen::default(),
            settings: SettingsScreen::default(),
            flash: None,
            spinner_frame: 0,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    /// Sections the signed-in operator may open, in sidebar order.
    pub fn sections(&self) -> Vec<Section> {
        self.role().map(visible_sections).unwrap_or_default()
    }

    pub fn set_flash(&mut self, text: impl Into<String>, is_error: bool) {
        self.flash = Some(Flash {
            text: text.into(),
            is_error,
            ticks_left: FLASH_TICKS,
        });
    }

    /// Drops all per-section data. Called on every logout so nothing from
    /// the previous operator leaks into the next session.
    pub fn clear_screens(&mut self) {
        self.active = Section::Dashboard;
        self.dashboard = DashboardScreen::default();
        self.users = UsersScreen::default();
        self.messages = MessagesScreen::default();
        self.broadcast = BroadcastScreen::default();
        self.logs = LogsScreen::default();
        self.admins = AdminsScreen::default();
        self.settings = SettingsScreen::default();
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}
