use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::User;

/// Route paths served by the auth API.
pub mod routes {
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const VERIFY: &str = "/auth/verify";
    pub const PROFILE: &str = "/auth/profile";
    pub const CHANGE_PASSWORD: &str = "/auth/change-password";
    pub const RESET_PASSWORD: &str = "/auth/reset-password";
    pub const RESET_PASSWORD_CONFIRM: &str = "/auth/reset-password/confirm";
    pub const VERIFY_EMAIL: &str = "/auth/verify-email";
    pub const HEALTH: &str = "/health";
}

/// Machine-readable error class carried next to the human message.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationError,
    InvalidCredentials,
    EmailNotVerified,
    Conflict,
    Unauthorized,
    NotFound,
    MethodNotAllowed,
    Internal,
}

/// `{success:false, error, code?, details?}`
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: Some(code),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Successful login.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Success carrying a user (verify, profile update).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UserResponse {
    pub success: bool,
    #[serde(default)]
    pub user: Option<User>,
}

/// Success carrying only a human-readable message.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `GET /health` body.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
