use thiserror::Error;

use crate::models::RecordId;

/// Client-level error type.
/// Every fallible operation in the crate returns `Result<T, ClientError>`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: no response was received.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// The backend answered 401. The session has already been cleared.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// An authenticated call was attempted without a credential.
    /// Raised locally, nothing is sent over the wire.
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend returned a payload that does not match the expected schema.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("A mutation for record {0} is already in flight")]
    MutationInFlight(RecordId),

    /// The session changed while the call was in flight; its result was discarded.
    #[error("Session ended before the request completed")]
    SessionEnded,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Storage(e.to_string())
    }
}

impl ClientError {
    /// Human-readable message suitable for display.
    ///
    /// Backend-supplied messages are passed through verbatim; everything else
    /// collapses to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Http { message, .. } if !message.trim().is_empty() => message.clone(),
            ClientError::Auth(message) if !message.trim().is_empty() => message.clone(),
            ClientError::Validation(message) => message.clone(),
            ClientError::NotAuthenticated | ClientError::SessionEnded => {
                "Your session has ended. Please log in again.".to_string()
            }
            ClientError::MutationInFlight(_) => {
                "This record is still being saved. Please wait and try again.".to_string()
            }
            _ => fallback.to_string(),
        }
    }

    /// True when the error means the caller must re-authenticate.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::Auth(_) | ClientError::NotAuthenticated | ClientError::SessionEnded
        )
    }
}
