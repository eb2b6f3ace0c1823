//! Authentication error types.

use thiserror::Error;

use super::token::TokenError;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Password too weak
    #[error("{0}")]
    WeakPassword(String),

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Account exists but the email address was never confirmed
    #[error("Please verify your email before logging in")]
    EmailNotVerified,

    /// Email already exists
    #[error("An account with this email already exists")]
    EmailTaken,

    /// Current password did not match during a password change
    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Token could not be decoded or has expired
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Token was issued for another purpose
    #[error("Invalid or expired token")]
    WrongTokenPurpose,

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Backing store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Storage, hashing and token internals are collapsed into generic
    /// messages.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Storage(_) | AuthError::HashingFailed => {
                "Internal server error".to_string()
            }
            AuthError::Token(_) | AuthError::WrongTokenPurpose => {
                "Invalid or expired token".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Whether the failure originates inside the server rather than from the caller
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::Storage(_) | AuthError::HashingFailed)
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_storage_details() {
        let err = AuthError::Storage("lock poisoned at users.rs:42".to_string());
        assert_eq!(err.client_message(), "Internal server error");
        assert!(err.is_internal());
    }

    #[test]
    fn test_client_message_collapses_token_errors() {
        assert_eq!(
            AuthError::Token(TokenError::Expired).client_message(),
            "Invalid or expired token"
        );
        assert_eq!(
            AuthError::WrongTokenPurpose.client_message(),
            "Invalid or expired token"
        );
    }

    #[test]
    fn test_invalid_credentials_message() {
        assert_eq!(
            AuthError::InvalidCredentials.client_message(),
            "Invalid email or password"
        );
        assert!(!AuthError::InvalidCredentials.is_internal());
    }
}
