//! Bearer authentication middleware for protected endpoints.
//!
//! Extracts the session token from the `Authorization` header, resolves it to
//! a user through the [`AuthManager`](actsfile::auth::AuthManager), and injects
//! that user into request extensions for downstream handlers.
//!
//! # Extracting the user
//!
//! ```rust,no_run
//! use af_server::api::middleware::AuthenticatedUser;
//! use axum::extract::Extension;
//!
//! async fn protected_handler(Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>) -> String {
//!     format!("Authenticated as {}", user.email)
//! }
//! # let _ = protected_handler;
//! ```

use actsfile::{
    auth::User,
    messages::{ErrorCode, ErrorResponse},
};
use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AppState, auth::error_response, request_id::RequestId};
use crate::{
    logging::{SecurityEvent, log_security_event},
    metrics::auth_events_total,
};

/// User resolved from a valid session token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub User);

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Authentication middleware that validates session tokens and injects the user.
///
/// # Behavior
///
/// - **Success**: Injects [`AuthenticatedUser`] → Calls next handler
/// - **Missing header**: `401` "No token provided"
/// - **Invalid/expired/wrong-purpose token**: `401` "Invalid or expired token"
/// - **Subject no longer exists**: `404` "User not found"
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string());

    let Some(token) = bearer_token(&request) else {
        auth_events_total("verify", "failure");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new(ErrorCode::Unauthorized, "No token provided")),
        )
            .into_response();
    };

    match state.auth_manager.verify_session(&token).await {
        Ok(user) => {
            request.extensions_mut().insert(AuthenticatedUser(user));
            next.run(request).await
        }
        Err(e) => {
            auth_events_total("verify", "failure");
            log_security_event(
                SecurityEvent::InvalidToken,
                None,
                request_id.as_deref(),
                &e.to_string(),
            );
            error_response(&e, state.expose_error_details).into_response()
        }
    }
}
