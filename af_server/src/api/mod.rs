//! HTTP API for the ActsFile auth server.
//!
//! # Endpoints Overview
//!
//! ## Public
//! - `POST /auth/login` - Exchange credentials for a session token
//! - `POST /auth/register` - Create an unverified account
//! - `POST /auth/reset-password` - Request a password reset notice
//! - `POST /auth/reset-password/confirm` - Set a new password with a reset token
//! - `POST /auth/verify-email` - Confirm an email address
//!
//! ## Bearer authenticated
//! - `GET /auth/verify` - Resolve the session token to its user
//! - `PUT /auth/profile` - Partial profile update
//! - `POST /auth/change-password` - Change password
//!
//! ## Health Check
//! - `GET /health`, `HEAD /health` - Liveness for clients and load balancers
//!
//! Every response carries `Cache-Control: no-cache, no-store, must-revalidate`.
//! A known path called with the wrong method answers `405` with an `Allow`
//! header and the usual JSON error envelope.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use actsfile::auth::{AuthManager, LogNotifier};
//! use actsfile::db::InMemoryUserRepository;
//! use af_server::api::{AppState, create_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let auth_manager = AuthManager::new(
//!     Arc::new(InMemoryUserRepository::new()),
//!     Arc::new(LogNotifier),
//!     "pepper_at_least_16".to_string(),
//!     "jwt_secret_that_is_at_least_32_chars".to_string(),
//! );
//!
//! let state = AppState::new(auth_manager, "development");
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod middleware;
pub mod request_id;

use actsfile::{
    auth::AuthManager,
    messages::{ErrorCode, ErrorResponse, HealthResponse, routes},
};
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{MethodRouter, get, post, put},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; the manager sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    /// Reported by `/health`
    pub environment: String,
    /// Attach internal error text to 500 responses
    pub expose_error_details: bool,
}

impl AppState {
    /// Build state for `environment`; error details are exposed only in `development`.
    pub fn new(auth_manager: AuthManager, environment: &str) -> Self {
        Self {
            auth_manager: Arc::new(auth_manager),
            environment: environment.to_string(),
            expose_error_details: environment.eq_ignore_ascii_case("development"),
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route(
            routes::LOGIN,
            with_allow(post(auth::login), "POST"),
        )
        .route(
            routes::REGISTER,
            with_allow(post(auth::register), "POST"),
        )
        .route(
            routes::RESET_PASSWORD,
            with_allow(post(auth::request_password_reset), "POST"),
        )
        .route(
            routes::RESET_PASSWORD_CONFIRM,
            with_allow(post(auth::confirm_password_reset), "POST"),
        )
        .route(
            routes::VERIFY_EMAIL,
            with_allow(post(auth::verify_email), "POST"),
        )
        .route(
            routes::HEALTH,
            with_allow(get(health_check).head(health_head), "GET, HEAD"),
        );

    // Auth wraps the handlers only, so a wrong method still gets the 405
    let authenticated =
        || axum::middleware::from_fn_with_state(state.clone(), middleware::auth_middleware);
    let protected_routes = Router::new()
        .route(
            routes::VERIFY,
            with_allow(get(auth::verify).route_layer(authenticated()), "GET, HEAD"),
        )
        .route(
            routes::PROFILE,
            with_allow(put(auth::update_profile).route_layer(authenticated()), "PUT"),
        )
        .route(
            routes::CHANGE_PASSWORD,
            with_allow(post(auth::change_password).route_layer(authenticated()), "POST"),
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Answer unsupported methods with a JSON 405 that lists the allowed ones.
fn with_allow(router: MethodRouter<AppState>, allow: &'static str) -> MethodRouter<AppState> {
    router.fallback(move || async move { method_not_allowed(allow) })
}

fn method_not_allowed(allow: &'static str) -> Response {
    let primary = allow.split(',').next().unwrap_or(allow).trim();
    let body = ErrorResponse::new(
        ErrorCode::MethodNotAllowed,
        format!("Method not allowed. Use {primary}."),
    );

    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allow)],
        Json(body),
    )
        .into_response()
}

/// Health check endpoint for monitoring and load balancers.
///
/// Probes the user store; returns `200 OK` with `status: "healthy"` or
/// `500` with `status: "error"` when the probe fails.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","timestamp":"2026-01-12T10:30:00Z","version":"1.0.0","environment":"development"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.auth_manager.health_check().await {
        Ok(users) => {
            crate::metrics::registered_users(users);
            (
                StatusCode::OK,
                Json(HealthResponse {
                    status: "healthy".to_string(),
                    timestamp: chrono::Utc::now(),
                    version: Some(env!("CARGO_PKG_VERSION").to_string()),
                    environment: Some(state.environment.clone()),
                    error: None,
                }),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "error".to_string(),
                    timestamp: chrono::Utc::now(),
                    version: None,
                    environment: None,
                    error: Some("Health check failed".to_string()),
                }),
            )
        }
    }
}

/// `HEAD /health`: status code only.
async fn health_head(State(state): State<AppState>) -> StatusCode {
    match state.auth_manager.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
