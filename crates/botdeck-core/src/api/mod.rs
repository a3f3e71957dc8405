//! Management API gateway.
//!
//! All server traffic from both front ends funnels through [`ApiClient`].
//! The client owns the in-memory session token: it injects the auth header
//! on every call made while a token is held, and it drops the token the
//! moment an authenticated call comes back 401. Persistent state (the
//! credential file, the session phase) is the session layer's job.

pub mod error;
pub mod types;

use std::sync::RwLock;
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use error::{ApiError, ApiErrorKind, ApiResult};
use types::{
    AdminAccount, AdminsResponse, AuthSession, Broadcast, BroadcastReceipt, BroadcastsResponse,
    CreateAdminResponse, DashboardStats, LogEntry, LogsResponse, MeResponse, PanelUser,
    SettingsMap, SettingsResponse, SetupStatus, UsersPage,
};

/// Header carrying the session token.
const AUTH_HEADER: &str = "X-Auth-Token";

/// HTTP client for the management API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Creates a client for the given deployment.
    ///
    /// `base_url` must already be validated and have no trailing slash.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            token: RwLock::new(None),
        })
    }

    /// Installs the session token injected on subsequent calls.
    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.into());
        }
    }

    /// Drops the in-memory token. Does not touch persistent state.
    pub fn clear_token(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }

    /// Whether a session token is currently held.
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|slot| slot.clone())
    }

    // --- session endpoints ---

    /// Probes whether the deployment has an owner account yet.
    ///
    /// Callable without a token; it is the first request the panel makes.
    pub async fn check_setup(&self) -> ApiResult<SetupStatus> {
        self.get("auth?action=setup").await
    }

    /// Registers the owner account on a fresh deployment.
    pub async fn register_owner(
        &self,
        login: &str,
        password: &str,
        display_name: &str,
    ) -> ApiResult<AuthSession> {
        let request = RegisterOwnerRequest {
            login,
            password,
            name: display_name,
        };
        self.post("auth?action=register_owner", &request).await
    }

    /// Signs in with login and password.
    pub async fn login(&self, login: &str, password: &str) -> ApiResult<AuthSession> {
        let request = LoginRequest { login, password };
        self.post("auth?action=login", &request).await
    }

    /// Validates the held token and returns the operator it belongs to.
    pub async fn me(&self) -> ApiResult<PanelUser> {
        let response: MeResponse = self.get("auth?action=me").await?;
        Ok(response.user)
    }

    /// Tells the server to invalidate the current session.
    pub async fn logout(&self) -> ApiResult<()> {
        let _: serde_json::Value = self.post("auth?action=logout", &EmptyBody {}).await?;
        Ok(())
    }

    // --- administrator endpoints (owner only) ---

    pub async fn list_admins(&self) -> ApiResult<Vec<AdminAccount>> {
        let response: AdminsResponse = self.get("auth?action=list_admins").await?;
        Ok(response.admins)
    }

    pub async fn create_admin(
        &self,
        login: &str,
        password: &str,
        display_name: &str,
    ) -> ApiResult<AdminAccount> {
        let request = CreateAdminRequest {
            login,
            password,
            name: display_name,
        };
        let response: CreateAdminResponse =
            self.post("auth?action=create_admin", &request).await?;
        Ok(response.admin)
    }

    /// Sets an administrator account active or disabled.
    pub async fn toggle_admin(&self, admin_id: i64, active: bool) -> ApiResult<()> {
        let request = ToggleAdminRequest { admin_id, active };
        let _: serde_json::Value = self.post("auth?action=toggle_admin", &request).await?;
        Ok(())
    }

    // --- panel data endpoints ---

    pub async fn stats(&self) -> ApiResult<DashboardStats> {
        self.get("stats").await
    }

    /// Fetches one page of the user directory, optionally filtered.
    pub async fn users(&self, page: u32, search: Option<&str>) -> ApiResult<UsersPage> {
        // The serializer is not Send; finish it before the request future.
        let query = {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            query.append_pair("action", "users");
            query.append_pair("page", &page.to_string());
            if let Some(search) = search
                && !search.is_empty()
            {
                query.append_pair("search", search);
            }
            query.finish()
        };
        self.get(&format!("manage?{query}")).await
    }

    /// Blocks or unblocks a bot user.
    pub async fn block_user(&self, telegram_id: i64, block: bool) -> ApiResult<()> {
        let request = BlockUserRequest { telegram_id, block };
        let _: serde_json::Value = self.post("manage?action=block_user", &request).await?;
        Ok(())
    }

    pub async fn settings(&self) -> ApiResult<SettingsMap> {
        let response: SettingsResponse = self.get("manage?action=settings").await?;
        Ok(response.settings)
    }

    /// Saves settings. The server expects the bare key-value map as the
    /// request body.
    pub async fn save_settings(&self, settings: &SettingsMap) -> ApiResult<()> {
        let _: serde_json::Value = self.post("manage?action=settings", settings).await?;
        Ok(())
    }

    pub async fn logs(&self) -> ApiResult<Vec<LogEntry>> {
        let response: LogsResponse = self.get("manage?action=logs").await?;
        Ok(response.logs)
    }

    /// Sends a direct message to one bot user. The delivery report is
    /// passed through verbatim for display.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> ApiResult<serde_json::Value> {
        let request = SendMessageRequest { chat_id, text };
        self.post("manage?action=send_message", &request).await
    }

    pub async fn broadcasts(&self) -> ApiResult<Vec<Broadcast>> {
        let response: BroadcastsResponse = self.get("broadcast").await?;
        Ok(response.broadcasts)
    }

    /// Sends a broadcast to every non-blocked bot user.
    pub async fn send_broadcast(&self, text: &str) -> ApiResult<BroadcastReceipt> {
        let request = BroadcastRequest { text };
        self.post("broadcast", &request).await
    }

    // --- transport ---

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let token = self.current_token();
        let mut request = self.http.get(format!("{}/{path}", self.base_url));
        if let Some(token) = &token {
            request = request.header(AUTH_HEADER, token);
        }
        let response = request.send().await.map_err(transport_error)?;
        self.handle_response(response, token.is_some()).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        let token = self.current_token();
        let mut request = self.http.post(format!("{}/{path}", self.base_url)).json(body);
        if let Some(token) = &token {
            request = request.header(AUTH_HEADER, token);
        }
        let response = request.send().await.map_err(transport_error)?;
        self.handle_response(response, token.is_some()).await
    }

    /// Classifies a response into a typed result.
    ///
    /// `authed` records whether a token was attached to the request: a 401
    /// on an authenticated call means the session died and the in-memory
    /// token is dropped, while a 401/403 on an unauthenticated call is a
    /// plain credential rejection.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        authed: bool,
    ) -> ApiResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::request_failed("Failed to read response").with_details(e.to_string()))?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                tracing::warn!(status = status.as_u16(), error = %e, "unparsable success response");
                ApiError::protocol("Unexpected response from the server")
                    .with_details(format!("{status}: {e}"))
            });
        }

        let message = ApiError::server_message(status.as_u16(), &body);
        let error = match status.as_u16() {
            401 if authed => {
                self.clear_token();
                ApiError::unauthorized(message)
            }
            401 | 403 => ApiError::auth(message),
            409 => ApiError::conflict(message),
            400..=499 => ApiError::validation(message),
            _ => ApiError::request_failed(message),
        };
        Err(error.with_details(format!("status {status}")))
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    let message = if e.is_timeout() {
        "Request timed out".to_string()
    } else {
        "Could not reach the server".to_string()
    };
    ApiError::request_failed(message).with_details(e.to_string())
}

#[derive(Serialize)]
struct EmptyBody {}

#[derive(Serialize)]
struct LoginRequest<'a> {
    login: &'a str,
    password: &'a str,
}

// The account endpoints take the display name under `name`, unlike the
// `displayName` key the server uses in responses.
#[derive(Serialize)]
struct RegisterOwnerRequest<'a> {
    login: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct CreateAdminRequest<'a> {
    login: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleAdminRequest {
    admin_id: i64,
    active: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockUserRequest {
    telegram_id: i64,
    block: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Serialize)]
struct BroadcastRequest<'a> {
    text: &'a str,
}
