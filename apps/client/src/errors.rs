use serde::Deserialize;
use thiserror::Error;

use crate::storage::StorageError;

/// Authentication failures, kept apart so callers can tell a rejected sign-in
/// from a session the server no longer honours.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error("No active session")]
    SignedOut,
}

/// Client-level error type.
/// Every controller and the session store return `Result<T, ClientError>`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// True when the server itself refused the credential (401/403).
    /// Transport failures, 5xx and decode errors say nothing about the token.
    pub fn is_authoritative_rejection(&self) -> bool {
        matches!(
            self,
            ClientError::Auth(AuthError::SessionExpired | AuthError::Forbidden(_))
        )
    }

    /// Message suitable for an inline banner or toast.
    /// Uses the backend's `detail` text when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Auth(AuthError::InvalidCredentials(msg))
            | ClientError::Auth(AuthError::Forbidden(msg))
            | ClientError::Server { message: msg, .. }
                if !msg.is_empty() =>
            {
                msg.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extracts the message from a FastAPI error body.
/// `detail` is a plain string for `HTTPException`s and a list of field errors for 422s.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .map(str::to_string)
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
