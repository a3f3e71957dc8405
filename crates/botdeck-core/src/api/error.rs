//! Error type for management API calls.

use serde::{Deserialize, Serialize};

/// Classification of a failed API call.
///
/// The kind is what the front ends dispatch on; the message is what the
/// operator sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Input rejected locally before any network traffic.
    Validation,
    /// Credentials rejected during sign-in or setup.
    Auth,
    /// A previously valid session was rejected. The holder must force
    /// a logout.
    Unauthorized,
    /// The request conflicts with server state (e.g. owner already exists).
    Conflict,
    /// Transport failure, timeout, or a server-side error status.
    RequestFailed,
    /// The server answered with a body the panel could not interpret.
    Protocol,
}

/// Error from the management API gateway.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    /// Raw server payload or transport detail, for logs only.
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Auth, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthorized, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Conflict, message)
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::RequestFailed, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Protocol, message)
    }

    /// Whether this error means the current session is no longer valid.
    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    /// Extracts the server's error message from a response body.
    ///
    /// The API reports failures as `{"error": "..."}`. Anything else falls
    /// back to a generic message keyed by status.
    pub fn server_message(status: u16, body: &str) -> String {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
            && let Some(message) = value.get("error").and_then(|v| v.as_str())
        {
            return message.to_string();
        }
        format!("Request failed with status {status}")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result alias for management API calls.
pub type ApiResult<T> = Result<T, ApiError>;
