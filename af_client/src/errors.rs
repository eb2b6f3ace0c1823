//! Client-side error taxonomy.

use actsfile::{
    auth::TokenError,
    messages::{ErrorCode, ErrorResponse},
};
use thiserror::Error;

/// Failures surfaced by [`AuthService`](crate::auth_service::AuthService).
///
/// `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected locally or by the server
    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Please verify your email before logging in")]
    EmailNotVerified,

    /// Email already registered
    #[error("{0}")]
    Conflict(String),

    /// Bearer token refused by the server
    #[error("{0}")]
    Unauthorized(String),

    /// No session token is stored
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Any other non-success status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Request timed out. Please check your connection and try again.")]
    Timeout,

    /// Transport failure; the cause is kept for logs only
    #[error("Network error. Please check your internet connection and try again.")]
    Network(String),

    /// Server-side failure or a non-JSON response
    #[error("{0}")]
    Server(String),

    /// JSON response that does not have the expected shape
    #[error("{0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Classify an error envelope, preferring its `code` over the status.
    pub fn from_envelope(status: u16, envelope: ErrorResponse) -> Self {
        let message = if envelope.error.trim().is_empty() {
            format!("Request failed with status {status}")
        } else {
            envelope.error
        };

        match envelope.code {
            Some(ErrorCode::ValidationError) => ClientError::Validation(message),
            Some(ErrorCode::InvalidCredentials) => ClientError::InvalidCredentials,
            Some(ErrorCode::EmailNotVerified) => ClientError::EmailNotVerified,
            Some(ErrorCode::Conflict) => ClientError::Conflict(message),
            Some(ErrorCode::Unauthorized) => ClientError::Unauthorized(message),
            Some(ErrorCode::Internal) => ClientError::Server(message),
            Some(ErrorCode::NotFound) | Some(ErrorCode::MethodNotAllowed) => {
                ClientError::Rejected { status, message }
            }
            None => match status {
                400 => ClientError::Validation(message),
                401 => ClientError::Unauthorized(message),
                409 => ClientError::Conflict(message),
                500..=599 => ClientError::Server(message),
                _ => ClientError::Rejected { status, message },
            },
        }
    }

    /// Whether the failure points at the connection rather than the request
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Timeout | ClientError::Network(_))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(error: &str, code: Option<ErrorCode>) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: error.to_string(),
            code,
            details: None,
        }
    }

    #[test]
    fn test_code_wins_over_status() {
        let err = ClientError::from_envelope(
            401,
            envelope("Please verify your email before logging in", Some(ErrorCode::EmailNotVerified)),
        );
        assert!(matches!(err, ClientError::EmailNotVerified));
    }

    #[test]
    fn test_status_fallback_without_code() {
        assert!(matches!(
            ClientError::from_envelope(409, envelope("taken", None)),
            ClientError::Conflict(msg) if msg == "taken"
        ));
        assert!(matches!(
            ClientError::from_envelope(503, envelope("down", None)),
            ClientError::Server(_)
        ));
        assert!(matches!(
            ClientError::from_envelope(418, envelope("teapot", None)),
            ClientError::Rejected { status: 418, .. }
        ));
    }

    #[test]
    fn test_empty_message_gets_status_text() {
        let err = ClientError::from_envelope(502, envelope("", None));
        assert_eq!(err.to_string(), "Request failed with status 502");
    }

    #[test]
    fn test_network_classification() {
        assert!(ClientError::Timeout.is_network());
        assert!(ClientError::Network("connection refused".into()).is_network());
        assert!(!ClientError::InvalidCredentials.is_network());
        assert!(!ClientError::Server("boom".into()).is_network());
    }
}
