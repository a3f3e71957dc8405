//! Effect handler implementations.
//!
//! Each handler is a pure async function that performs the I/O for one
//! effect and returns the resulting `UiEvent`. The runtime spawns these
//! and routes their results through the inbox.

use std::sync::Arc;

use botdeck_core::api::types::SettingsMap;
use botdeck_core::api::{ApiClient, ApiError};
use botdeck_core::roles::Section;
use botdeck_core::session::SessionManager;
use tokio::sync::Mutex;

use crate::effects::SectionQuery;
use crate::events::{ActionOutcome, SectionData, UiEvent};

pub async fn resolve_session(session: Arc<Mutex<SessionManager>>) -> UiEvent {
    let mut session = session.lock().await;
    let phase = session.resolve().await;
    UiEvent::SessionResolved {
        phase,
        user: session.user().cloned(),
    }
}

pub async fn submit_login(
    session: Arc<Mutex<SessionManager>>,
    login: String,
    password: String,
) -> UiEvent {
    let mut session = session.lock().await;
    let result = match session.login(&login, &password).await {
        Ok(()) => signed_in_user(&session),
        Err(e) => Err(e),
    };
    UiEvent::AuthCompleted { result }
}

pub async fn submit_setup(
    session: Arc<Mutex<SessionManager>>,
    login: String,
    password: String,
    display_name: String,
) -> UiEvent {
    let mut session = session.lock().await;
    let result = match session.register_owner(&login, &password, &display_name).await {
        Ok(()) => signed_in_user(&session),
        Err(e) => Err(e),
    };
    UiEvent::AuthCompleted { result }
}

fn signed_in_user(
    session: &SessionManager,
) -> Result<botdeck_core::api::types::PanelUser, ApiError> {
    session
        .user()
        .cloned()
        .ok_or_else(|| ApiError::protocol("Signed in without an operator profile"))
}

pub async fn logout(session: Arc<Mutex<SessionManager>>) -> UiEvent {
    session.lock().await.logout().await;
    UiEvent::LoggedOut
}

/// Tears down a session the server has rejected. The teardown itself is
/// idempotent, so stacked failures from parallel fetches are safe.
pub async fn force_logout(session: Arc<Mutex<SessionManager>>) -> UiEvent {
    session.lock().await.handle_unauthorized();
    UiEvent::SessionExpired
}

pub async fn load_section(
    api: Arc<ApiClient>,
    section: Section,
    generation: u64,
    query: SectionQuery,
) -> UiEvent {
    let result = match section {
        Section::Dashboard => api.stats().await.map(SectionData::Stats),
        Section::Users => {
            let (page, search) = match query {
                SectionQuery::Users { page, search } => (page.max(1), search),
                SectionQuery::None => (1, None),
            };
            api.users(page, search.as_deref())
                .await
                .map(SectionData::Users)
        }
        Section::Broadcast => api.broadcasts().await.map(SectionData::Broadcasts),
        Section::Logs => api.logs().await.map(SectionData::Logs),
        Section::Admins => api.list_admins().await.map(SectionData::Admins),
        Section::Settings => api.settings().await.map(SectionData::Settings),
        // The reducer never dispatches a fetch for Messages.
        Section::Messages => Err(ApiError::protocol("Section has no data to load")),
    };
    UiEvent::SectionLoaded {
        section,
        generation,
        result,
    }
}

pub async fn block_user(api: Arc<ApiClient>, telegram_id: i64, blocked: bool) -> UiEvent {
    let result = api
        .block_user(telegram_id, blocked)
        .await
        .map(|()| ActionOutcome::UserBlocked { blocked });
    UiEvent::ActionCompleted { result }
}

pub async fn send_broadcast(api: Arc<ApiClient>, text: String) -> UiEvent {
    let result = api
        .send_broadcast(&text)
        .await
        .map(ActionOutcome::BroadcastSent);
    UiEvent::ActionCompleted { result }
}

pub async fn send_direct_message(api: Arc<ApiClient>, chat_id: i64, text: String) -> UiEvent {
    let result = api
        .send_message(chat_id, &text)
        .await
        .map(|_| ActionOutcome::MessageSent);
    UiEvent::ActionCompleted { result }
}

pub async fn save_settings(api: Arc<ApiClient>, settings: SettingsMap) -> UiEvent {
    let result = api
        .save_settings(&settings)
        .await
        .map(|()| ActionOutcome::SettingsSaved);
    UiEvent::ActionCompleted { result }
}

pub async fn create_admin(
    api: Arc<ApiClient>,
    login: String,
    password: String,
    display_name: String,
) -> UiEvent {
    let result = api
        .create_admin(&login, &password, &display_name)
        .await
        .map(ActionOutcome::AdminCreated);
    UiEvent::ActionCompleted { result }
}

pub async fn toggle_admin(api: Arc<ApiClient>, admin_id: i64, active: bool) -> UiEvent {
    let result = api
        .toggle_admin(admin_id, active)
        .await
        .map(|()| ActionOutcome::AdminToggled);
    UiEvent::ActionCompleted { result }
}
