//! Out-of-band delivery of verification and password-reset tokens.

use async_trait::async_trait;
use std::sync::Mutex;

use super::models::User;

/// Kind of message handed to a notifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    EmailVerification,
    PasswordReset,
}

/// A message that would be emailed to a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub email: String,
    pub token: String,
}

/// Sink for account emails
#[async_trait]
pub trait AuthNotifier: Send + Sync {
    /// Deliver an email-verification token to a freshly registered user
    async fn send_verification(&self, user: &User, token: &str);

    /// Deliver a password-reset token
    async fn send_password_reset(&self, user: &User, token: &str);
}

/// Writes tokens to the log instead of sending email
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl AuthNotifier for LogNotifier {
    async fn send_verification(&self, user: &User, token: &str) {
        log::info!("Email verification for {}: token={}", user.email, token);
    }

    async fn send_password_reset(&self, user: &User, token: &str) {
        log::info!("Password reset for {}: token={}", user.email, token);
    }
}

/// Keeps every notice in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notices sent so far
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    /// Most recent token of `kind` sent to `email`
    pub fn latest_token(&self, kind: NoticeKind, email: &str) -> Option<String> {
        self.notices()
            .into_iter()
            .rev()
            .find(|n| n.kind == kind && n.email.eq_ignore_ascii_case(email))
            .map(|n| n.token)
    }

    fn push(&self, kind: NoticeKind, user: &User, token: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(Notice {
                kind,
                email: user.email.clone(),
                token: token.to_string(),
            });
        }
    }
}

#[async_trait]
impl AuthNotifier for MemoryNotifier {
    async fn send_verification(&self, user: &User, token: &str) {
        self.push(NoticeKind::EmailVerification, user, token);
    }

    async fn send_password_reset(&self, user: &User, token: &str) {
        self.push(NoticeKind::PasswordReset, user, token);
    }
}
