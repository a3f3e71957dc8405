//! Session state machine.
//!
//! The panel is always in exactly one phase:
//!
//! ```text
//! Checking -> NeedsSetup ----register_owner---> Authenticated
//!          -> NeedsLogin ----login------------> Authenticated
//! Authenticated --logout / handle_unauthorized--> NeedsLogin
//! ```
//!
//! [`SessionManager`] is the only writer of the phase, the credential file
//! and the gateway token. Holders wrap it in a mutex and serialize
//! transitions through it; the gateway itself never flips the phase.
//! Non-interactive commands may skip validation and enter the
//! authenticated phase straight from the stored record via
//! [`SessionManager::adopt_stored`]; the first rejected call still forces
//! a logout through [`SessionManager::handle_unauthorized`].

use std::sync::Arc;

use crate::api::types::{AuthSession, PanelUser};
use crate::api::{ApiClient, ApiError, ApiResult};
use crate::credentials::{CredentialStore, Credentials};
use crate::roles::Role;

/// Minimum accepted password length, matched to the server rule so the
/// panel can reject short passwords without a round trip.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Stored credentials are being validated. Initial phase.
    Checking,
    /// The deployment has no owner account; show the setup form.
    NeedsSetup,
    /// No valid session; show the sign-in form.
    NeedsLogin,
    /// A validated operator session is active.
    Authenticated,
}

/// Owns the session phase and keeps the gateway token, the credential
/// file and the cached operator profile consistent with it.
pub struct SessionManager {
    api: Arc<ApiClient>,
    store: CredentialStore,
    phase: SessionPhase,
    user: Option<PanelUser>,
}

impl SessionManager {
    pub fn new(api: Arc<ApiClient>, store: CredentialStore) -> Self {
        Self {
            api,
            store,
            phase: SessionPhase::Checking,
            user: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn user(&self) -> Option<&PanelUser> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// Resolves the startup phase.
    ///
    /// Tries the stored token first; if the server rejects or cannot
    /// confirm it, the record is discarded and the setup probe decides
    /// between [`SessionPhase::NeedsSetup`] and [`SessionPhase::NeedsLogin`].
    /// This never fails: any doubt lands on the sign-in form.
    pub async fn resolve(&mut self) -> SessionPhase {
        if let Ok(Some(credentials)) = self.store.load() {
            self.api.set_token(&credentials.token);
            match self.api.me().await {
                Ok(user) => {
                    // Re-save so the cached profile tracks server truth.
                    self.enter_authenticated(AuthSession {
                        token: credentials.token,
                        user,
                    });
                    return self.phase;
                }
                Err(e) => {
                    tracing::info!(error = %e, "stored session rejected, discarding");
                    self.api.clear_token();
                    if let Err(e) = self.store.clear() {
                        tracing::warn!(error = %e, "failed to clear credential file");
                    }
                }
            }
        }

        self.phase = match self.api.check_setup().await {
            Ok(status) if !status.has_owner => SessionPhase::NeedsSetup,
            Ok(_) => SessionPhase::NeedsLogin,
            Err(e) => {
                tracing::warn!(error = %e, "setup probe failed, assuming existing deployment");
                SessionPhase::NeedsLogin
            }
        };
        self.user = None;
        self.phase
    }

    /// Adopts the stored credential record without a validation round trip.
    ///
    /// Returns whether a record was found. The record is trusted until the
    /// server rejects a call made with it.
    pub fn adopt_stored(&mut self) -> bool {
        match self.store.load() {
            Ok(Some(credentials)) => {
                self.api.set_token(&credentials.token);
                self.user = Some(credentials.user);
                self.phase = SessionPhase::Authenticated;
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read credential file");
                false
            }
        }
    }

    /// Signs in and, on success, enters the authenticated phase.
    ///
    /// Only valid from [`SessionPhase::NeedsLogin`].
    pub async fn login(&mut self, login: &str, password: &str) -> ApiResult<()> {
        self.ensure_phase(SessionPhase::NeedsLogin)?;
        validate_credentials(login, password)?;
        let session = self.api.login(login.trim(), password).await?;
        self.enter_authenticated(session);
        Ok(())
    }

    /// Registers the owner account and enters the authenticated phase.
    ///
    /// Only valid from [`SessionPhase::NeedsSetup`].
    pub async fn register_owner(
        &mut self,
        login: &str,
        password: &str,
        display_name: &str,
    ) -> ApiResult<()> {
        self.ensure_phase(SessionPhase::NeedsSetup)?;
        validate_credentials(login, password)?;
        let display_name = display_name.trim();
        let display_name = if display_name.is_empty() {
            login.trim()
        } else {
            display_name
        };
        let session = self
            .api
            .register_owner(login.trim(), password, display_name)
            .await?;
        self.enter_authenticated(session);
        Ok(())
    }

    /// Signs out. The server is told first so it can invalidate the token,
    /// but local state is cleared even if that call fails.
    pub async fn logout(&mut self) {
        if self.api.has_token() {
            if let Err(e) = self.api.logout().await {
                tracing::warn!(error = %e, "server logout failed, clearing local session anyway");
            }
        }
        self.clear_session();
    }

    /// Reacts to a rejected session reported by any API call.
    ///
    /// Idempotent: only an authenticated session is torn down, so stacked
    /// failures from parallel calls force a single logout. Returns whether
    /// this call performed the teardown.
    pub fn handle_unauthorized(&mut self) -> bool {
        if self.phase != SessionPhase::Authenticated {
            return false;
        }
        self.clear_session();
        true
    }

    fn ensure_phase(&self, expected: SessionPhase) -> ApiResult<()> {
        if self.phase == expected {
            return Ok(());
        }
        let message = match self.phase {
            SessionPhase::Checking => "Session has not been resolved yet",
            SessionPhase::NeedsSetup => "No owner account exists yet",
            SessionPhase::NeedsLogin => "An owner account already exists",
            SessionPhase::Authenticated => "Already signed in",
        };
        Err(ApiError::validation(message))
    }

    fn enter_authenticated(&mut self, session: AuthSession) {
        self.api.set_token(&session.token);
        let credentials = Credentials {
            token: session.token,
            user: session.user.clone(),
        };
        if let Err(e) = self.store.save(&credentials) {
            // Session still works for this run, it just won't survive a restart.
            tracing::warn!(error = %e, "failed to persist credentials");
        }
        self.user = Some(session.user);
        self.phase = SessionPhase::Authenticated;
    }

    fn clear_session(&mut self) {
        self.api.clear_token();
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear credential file");
        }
        self.user = None;
        self.phase = SessionPhase::NeedsLogin;
    }
}

/// Rejects obviously invalid credentials before any network traffic.
fn validate_credentials(login: &str, password: &str) -> ApiResult<()> {
    if login.trim().is_empty() {
        return Err(ApiError::validation("Login must not be empty"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
