//! Full-screen terminal panel for botdeck.

pub mod common;
pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod screens;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};
use std::sync::Arc;

use anyhow::Result;
use botdeck_core::api::ApiClient;
use botdeck_core::config::Config;
use botdeck_core::credentials::CredentialStore;
use botdeck_core::session::SessionManager;
pub use runtime::TuiRuntime;

/// Runs the interactive panel.
pub async fn run_panel(config: &Config) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The panel requires a terminal.\n\
             Use subcommands like `botdeck stats` for non-interactive use."
        );
    }

    let base_url = config.resolved_base_url()?;
    let api = Arc::new(ApiClient::new(base_url, config.request_timeout())?);
    let session = SessionManager::new(api, CredentialStore::new());

    let mut runtime = TuiRuntime::new(session)?;
    runtime.run()
}
