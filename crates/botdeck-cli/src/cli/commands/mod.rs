//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod panel;

use std::sync::Arc;

use anyhow::Result;
use botdeck_core::api::{ApiClient, ApiError};
use botdeck_core::config::Config;
use botdeck_core::credentials::CredentialStore;
use botdeck_core::session::SessionManager;

/// Builds an API client from the resolved configuration.
pub(crate) fn api_client(config: &Config) -> Result<Arc<ApiClient>> {
    let base_url = config.resolved_base_url()?;
    Ok(Arc::new(ApiClient::new(
        base_url,
        config.request_timeout(),
    )?))
}

/// Builds a session manager over the default credential store.
pub(crate) fn session_manager(config: &Config) -> Result<SessionManager> {
    let api = api_client(config)?;
    Ok(SessionManager::new(api, CredentialStore::new()))
}

/// Builds a session manager that has adopted the stored session token.
///
/// Fails with a sign-in hint when no credentials are stored. The token is
/// not validated up front; the first rejected call goes through
/// [`map_expired`].
pub(crate) fn authed_session(config: &Config) -> Result<SessionManager> {
    let mut session = session_manager(config)?;
    if !session.adopt_stored() {
        anyhow::bail!("Not signed in. Run `botdeck login` first.");
    }
    Ok(session)
}

/// Maps a rejected-session error to a sign-in hint, tearing the session
/// down so the next command starts clean.
pub(crate) fn map_expired(session: &mut SessionManager, e: ApiError) -> anyhow::Error {
    if e.is_unauthorized() {
        session.handle_unauthorized();
        anyhow::anyhow!("Session expired. Run `botdeck login` to sign in again.")
    } else {
        e.into()
    }
}
