//! UI event types.
//!
//! Every input to the reducer is a `UiEvent`: terminal input, the frame
//! tick, and results of async work delivered through the runtime inbox.

use botdeck_core::api::ApiError;
use botdeck_core::api::types::{
    AdminAccount, Broadcast, BroadcastReceipt, DashboardStats, LogEntry, PanelUser, SettingsMap,
    UsersPage,
};
use botdeck_core::roles::Section;
use botdeck_core::session::SessionPhase;

/// Events processed by the reducer.
#[derive(Debug)]
pub enum UiEvent {
    /// Frame tick. Drives spinner animation and flash expiry.
    Tick,
    /// Raw terminal input.
    Terminal(crossterm::event::Event),
    /// Startup resolution finished.
    SessionResolved {
        phase: SessionPhase,
        user: Option<PanelUser>,
    },
    /// Sign-in or owner setup finished.
    AuthCompleted { result: Result<PanelUser, ApiError> },
    /// Explicit sign-out finished.
    LoggedOut,
    /// A forced logout was performed after the server rejected the session.
    SessionExpired,
    /// A section fetch finished.
    SectionLoaded {
        section: Section,
        generation: u64,
        result: Result<SectionData, ApiError>,
    },
    /// A mutating panel action finished.
    ActionCompleted {
        result: Result<ActionOutcome, ApiError>,
    },
}

/// Payload of a completed section fetch.
#[derive(Debug)]
pub enum SectionData {
    Stats(DashboardStats),
    Users(UsersPage),
    Broadcasts(Vec<Broadcast>),
    Logs(Vec<LogEntry>),
    Admins(Vec<AdminAccount>),
    Settings(SettingsMap),
}

/// Successful outcome of a mutating action, used for the flash message
/// and to decide which section to refresh.
#[derive(Debug)]
pub enum ActionOutcome {
    UserBlocked { blocked: bool },
    BroadcastSent(BroadcastReceipt),
    MessageSent,
    SettingsSaved,
    AdminCreated(AdminAccount),
    AdminToggled,
}
