//! Authentication API handlers.
//!
//! This module provides HTTP REST endpoints for:
//! - Registration (account starts unverified, a verification notice is sent)
//! - Login with email/password
//! - Session verification for bearer tokens
//! - Profile update and password change
//! - Password reset and email verification with out-of-band tokens
//!
//! All endpoints return JSON: a success body, or the error envelope
//! `{success:false, error, code?, details?}`.
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:3000/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"name":"Amina","email":"amina@example.com","password":"longenough","agreeToTerms":true}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:3000/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email":"amina@example.com","password":"longenough"}'
//! ```

use actsfile::{
    auth::{
        AuthError, ChangePasswordRequest, EmailVerificationRequest, LoginRequest,
        PasswordResetConfirm, PasswordResetRequest, ProfileUpdate, RegisterRequest,
    },
    messages::{ErrorCode, ErrorResponse, LoginResponse, MessageResponse, UserResponse},
};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use super::{AppState, middleware::AuthenticatedUser, request_id::RequestId};
use crate::{
    logging::{SecurityEvent, log_security_event},
    metrics::auth_events_total,
};

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a domain error onto a status code and a sanitized envelope.
pub fn error_response(err: &AuthError, expose_details: bool) -> ApiError {
    let (status, code) = match err {
        AuthError::Validation(_) | AuthError::WeakPassword(_) | AuthError::IncorrectPassword => {
            (StatusCode::BAD_REQUEST, ErrorCode::ValidationError)
        }
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, ErrorCode::InvalidCredentials),
        AuthError::EmailNotVerified => (StatusCode::UNAUTHORIZED, ErrorCode::EmailNotVerified),
        AuthError::EmailTaken => (StatusCode::CONFLICT, ErrorCode::Conflict),
        AuthError::Token(_) | AuthError::WrongTokenPurpose => {
            (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized)
        }
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
        AuthError::HashingFailed | AuthError::Storage(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal)
        }
    };

    let mut body = ErrorResponse::new(code, err.client_message());
    if err.is_internal() {
        tracing::error!(error = %err, "Internal auth failure");
        if expose_details {
            body = body.with_details(err.to_string());
        }
    }

    (status, Json(body))
}

fn invalid_json(rejection: JsonRejection) -> ApiError {
    tracing::debug!(rejection = %rejection, "Rejected request body");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(
            ErrorCode::ValidationError,
            "Invalid JSON in request body",
        )),
    )
}

/// Register a new account.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Amina",
///   "email": "amina@example.com",
///   "password": "longenough",
///   "phone": "+233 20 000 0000",   // Optional
///   "location": "Accra, Ghana",    // Optional
///   "agreeToTerms": true
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{"success": true, "message": "..."}`. The account is
/// unverified until the emailed token is confirmed.
///
/// # Errors
///
/// - `400 Bad Request`: Missing fields, invalid email, short password, terms not accepted
/// - `409 Conflict`: Email already registered
/// - `500 Internal Server Error`
pub async fn register(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(payload) = payload.map_err(invalid_json)?;
    let email = payload.email.trim().to_lowercase();

    match state.auth_manager.register(payload).await {
        Ok(user) => {
            auth_events_total("register", "success");
            tracing::info!(request_id = %request_id.as_str(), user_id = %user.id, "User registered");
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse::ok(
                    "Registration successful. Please check your email to verify your account.",
                )),
            ))
        }
        Err(e) => {
            auth_events_total("register", "failure");
            if matches!(e, AuthError::EmailTaken) {
                log_security_event(
                    SecurityEvent::DuplicateRegistration,
                    Some(&email),
                    Some(request_id.as_str()),
                    "Registration attempted for existing email",
                );
            }
            Err(error_response(&e, state.expose_error_details))
        }
    }
}

/// Exchange credentials for a session token.
///
/// # Request Body
///
/// ```json
/// { "email": "amina@example.com", "password": "longenough" }
/// ```
///
/// # Response
///
/// `200 OK` with `{"success": true, "token": "eyJhbGciOiJIUzI1NiIs...", "user": {...}}`
///
/// # Errors
///
/// - `400 Bad Request`: Missing email/password or malformed email
/// - `401 Unauthorized`: Invalid credentials (`invalid_credentials`) or
///   unverified email (`email_not_verified`)
///
/// # Security
///
/// - Unknown email and wrong password produce the same message
/// - Failed attempts are logged as security events
pub async fn login(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload.map_err(invalid_json)?;
    let email = payload.email.trim().to_lowercase();

    match state.auth_manager.login(payload).await {
        Ok((user, token)) => {
            auth_events_total("login", "success");
            tracing::info!(request_id = %request_id.as_str(), user_id = %user.id, "Login succeeded");
            Ok(Json(LoginResponse {
                success: true,
                token: Some(token),
                user: Some(user),
            }))
        }
        Err(e) => {
            auth_events_total("login", "failure");
            if matches!(e, AuthError::InvalidCredentials | AuthError::EmailNotVerified) {
                log_security_event(
                    SecurityEvent::FailedLogin,
                    Some(&email),
                    Some(request_id.as_str()),
                    &e.to_string(),
                );
            }
            Err(error_response(&e, state.expose_error_details))
        }
    }
}

/// Resolve the bearer token to its user.
///
/// The token has already been checked by [`super::middleware::auth_middleware`].
///
/// # Response
///
/// `200 OK` with `{"success": true, "user": {...}}`
pub async fn verify(Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>) -> Json<UserResponse> {
    auth_events_total("verify", "success");
    Json(UserResponse {
        success: true,
        user: Some(user),
    })
}

/// Apply a partial profile update for the bearer's account.
///
/// Only the fields present in the body change; `email` and `isVerified` are
/// not updatable here.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(update) = payload.map_err(invalid_json)?;

    let updated = state
        .auth_manager
        .update_profile(user.id, update)
        .await
        .map_err(|e| error_response(&e, state.expose_error_details))?;

    auth_events_total("update_profile", "success");
    Ok(Json(UserResponse {
        success: true,
        user: Some(updated),
    }))
}

/// Change the bearer's password.
///
/// # Errors
///
/// - `400 Bad Request`: Current password incorrect or new password too short
pub async fn change_password(
    State(state): State<AppState>,
    request_id: RequestId,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_json)?;

    if let Err(e) = state.auth_manager.change_password(user.id, request).await {
        auth_events_total("change_password", "failure");
        if matches!(e, AuthError::IncorrectPassword) {
            log_security_event(
                SecurityEvent::PasswordChangeRejected,
                Some(&user.id.to_string()),
                Some(request_id.as_str()),
                "Current password did not match",
            );
        }
        return Err(error_response(&e, state.expose_error_details));
    }

    auth_events_total("change_password", "success");
    Ok(Json(MessageResponse::ok("Password updated successfully")))
}

/// Request a password reset notice.
///
/// Answers identically whether or not the email belongs to an account.
pub async fn request_password_reset(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_json)?;

    state
        .auth_manager
        .request_password_reset(&request.email)
        .await
        .map_err(|e| error_response(&e, state.expose_error_details))?;

    auth_events_total("reset_request", "success");
    log_security_event(
        SecurityEvent::PasswordResetRequested,
        None,
        Some(request_id.as_str()),
        "Password reset requested",
    );
    Ok(Json(MessageResponse::ok(
        "If an account exists for that email, a password reset link has been sent.",
    )))
}

/// Set a new password using the token from a reset notice.
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    payload: Result<Json<PasswordResetConfirm>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_json)?;

    match state.auth_manager.confirm_password_reset(request).await {
        Ok(()) => {
            auth_events_total("reset_confirm", "success");
            Ok(Json(MessageResponse::ok(
                "Password has been reset. You can now log in.",
            )))
        }
        Err(e) => {
            auth_events_total("reset_confirm", "failure");
            Err(error_response(&e, state.expose_error_details))
        }
    }
}

/// Confirm an email address using the token from a verification notice.
pub async fn verify_email(
    State(state): State<AppState>,
    payload: Result<Json<EmailVerificationRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_json)?;

    match state.auth_manager.verify_email(&request.token).await {
        Ok(user) => {
            auth_events_total("verify_email", "success");
            tracing::info!(user_id = %user.id, "Email verified");
            Ok(Json(MessageResponse::ok(
                "Email verified successfully. You can now log in.",
            )))
        }
        Err(e) => {
            auth_events_total("verify_email", "failure");
            Err(error_response(&e, state.expose_error_details))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actsfile::auth::TokenError;

    #[test]
    fn test_error_mapping_statuses() {
        let cases = [
            (AuthError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::IncorrectPassword, StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::EmailNotVerified, StatusCode::UNAUTHORIZED),
            (AuthError::EmailTaken, StatusCode::CONFLICT),
            (AuthError::Token(TokenError::Expired), StatusCode::UNAUTHORIZED),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (AuthError::HashingFailed, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let (status, _) = error_response(&err, false);
            assert_eq!(status, expected, "{err:?}");
        }
    }

    #[test]
    fn test_internal_details_only_when_exposed() {
        let err = AuthError::Storage("disk on fire".to_string());

        let (_, Json(hidden)) = error_response(&err, false);
        assert_eq!(hidden.error, "Internal server error");
        assert!(hidden.details.is_none());

        let (_, Json(shown)) = error_response(&err, true);
        assert_eq!(shown.details.as_deref(), Some("Storage error: disk on fire"));
    }

    #[test]
    fn test_email_not_verified_code() {
        let (_, Json(body)) = error_response(&AuthError::EmailNotVerified, false);
        assert_eq!(body.code, Some(ErrorCode::EmailNotVerified));
        assert_eq!(body.error, "Please verify your email before logging in");
    }
}
