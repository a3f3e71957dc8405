//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer never performs I/O itself; everything that touches the
//! network or the credential store goes through one of these.

use botdeck_core::api::types::SettingsMap;
use botdeck_core::roles::Section;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Validate stored credentials and resolve the initial phase.
    ResolveSession,

    /// Submit the sign-in form.
    SubmitLogin { login: String, password: String },

    /// Submit the owner setup form.
    SubmitSetup {
        login: String,
        password: String,
        display_name: String,
    },

    /// Sign out, telling the server first.
    Logout,

    /// Tear down a session the server has already rejected.
    ForceLogout,

    /// Fetch data for a section.
    LoadSection {
        section: Section,
        generation: u64,
        query: SectionQuery,
    },

    /// Block or unblock a bot user.
    BlockUser { telegram_id: i64, blocked: bool },

    /// Send a broadcast to all non-blocked users.
    SendBroadcast { text: String },

    /// Send a direct message to one user.
    SendDirectMessage { chat_id: i64, text: String },

    /// Persist the settings map.
    SaveSettings { settings: SettingsMap },

    /// Create an administrator account (owner only).
    CreateAdmin {
        login: String,
        password: String,
        display_name: String,
    },

    /// Enable or disable an administrator account (owner only). `active`
    /// is the state the account should end up in.
    ToggleAdmin { admin_id: i64, active: bool },
}

/// Per-section fetch parameters.
#[derive(Debug, Clone, Default)]
pub enum SectionQuery {
    #[default]
    None,
    Users {
        page: u32,
        search: Option<String>,
    },
}
