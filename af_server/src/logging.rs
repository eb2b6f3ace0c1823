//! Tracing setup and the auth server's structured events.
//!
//! Library code in `actsfile` logs through the `log` facade; those records
//! end up in the same subscriber as the server's own `tracing` events.

use std::fmt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,hyper=warn";

/// Requests slower than this are logged at warn level
pub const SLOW_REQUEST_MS: u64 = 1000;

/// Install the global subscriber.
///
/// ```no_run
/// af_server::logging::init();
/// tracing::info!("Server starting");
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();
}

/// Account events worth a security audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    FailedLogin,
    DuplicateRegistration,
    PasswordChangeRejected,
    PasswordResetRequested,
    InvalidToken,
}

impl SecurityEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEvent::FailedLogin => "failed_login",
            SecurityEvent::DuplicateRegistration => "duplicate_registration",
            SecurityEvent::PasswordChangeRejected => "password_change_rejected",
            SecurityEvent::PasswordResetRequested => "password_reset_requested",
            SecurityEvent::InvalidToken => "invalid_token",
        }
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emit a security event.
///
/// `subject` is the account the event concerns (email or user id), when
/// known. Reset requests pass `None` so the log does not reveal which
/// addresses have accounts.
pub fn log_security_event(
    event: SecurityEvent,
    subject: Option<&str>,
    request_id: Option<&str>,
    message: &str,
) {
    tracing::warn!(
        event_type = event.as_str(),
        subject,
        request_id,
        "SECURITY: {}",
        message
    );
}

/// One line per finished request; slow ones at warn level
pub fn log_api_request(method: &str, route: &str, status: u16, duration_ms: u64) {
    if duration_ms > SLOW_REQUEST_MS {
        tracing::warn!(method, route, status, duration_ms, "Slow API request");
    } else {
        tracing::info!(method, route, status, duration_ms, "API request completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(SecurityEvent::FailedLogin.as_str(), "failed_login");
        assert_eq!(SecurityEvent::InvalidToken.to_string(), "invalid_token");
    }

    #[test]
    fn test_logging_without_subscriber() {
        log_security_event(SecurityEvent::FailedLogin, Some("a@b.com"), Some("req-1"), "nope");
        log_security_event(SecurityEvent::PasswordResetRequested, None, None, "reset");
        log_api_request("GET", "/auth/verify", 200, 45);
        log_api_request("POST", "/auth/login", 401, SLOW_REQUEST_MS + 1);
    }
}
