//! Client-side orchestration of the auth lifecycle.
//!
//! [`AuthService`] is the only writer of the [`SessionStore`]: a token is
//! saved after a successful login and cleared on logout or whenever the
//! server no longer accepts it.

use actsfile::auth::{
    ChangePasswordRequest, EmailVerificationRequest, LoginRequest, MIN_PASSWORD_LEN,
    PasswordResetConfirm, PasswordResetRequest, ProfileUpdate, RegisterRequest, User,
    decode_unverified, is_valid_email,
};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    api_client::ApiClient,
    config::ClientConfig,
    errors::{ClientError, ClientResult},
    session_store::{FileSessionStore, SessionStore},
};

/// Login, registration, session verification and account maintenance
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
}

impl AuthService {
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        Self { api, store }
    }

    /// Service over a file-backed session at `config.session_file`
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            ApiClient::new(config),
            Arc::new(FileSessionStore::new(config.session_file.clone())),
        )
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Exchange credentials for a session; the token is stored only on success.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let email = email.trim();
        if email.is_empty() || password.trim().is_empty() {
            return Err(ClientError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        log::info!("Attempting login for {}", email);
        let (user, token) = self
            .api
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.store.save(&token)?;
        log::info!("Login successful for {}", user.email);
        Ok(user)
    }

    /// Register a new account and return the server's message.
    ///
    /// Obvious problems are reported before any request is made.
    pub async fn register(&self, data: RegisterRequest) -> ClientResult<String> {
        let name = data.name.trim();
        let email = data.email.trim();

        if name.is_empty() || email.is_empty() || data.password.trim().is_empty() {
            return Err(ClientError::Validation(
                "Name, email, and password are required".to_string(),
            ));
        }
        if !is_valid_email(email) {
            return Err(ClientError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        if data.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::Validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }
        if !data.agree_to_terms {
            return Err(ClientError::Validation(
                "You must agree to the terms and conditions".to_string(),
            ));
        }

        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: data.password,
            phone: trimmed(data.phone),
            location: trimmed(data.location),
            agree_to_terms: true,
        };

        self.api.register(&request).await
    }

    /// Resolve the stored token to a user.
    ///
    /// Returns `None` without a request when nothing is stored or the token
    /// has already expired locally. Any failure clears the stored token.
    pub async fn verify_session(&self) -> Option<User> {
        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Could not read stored session: {}", e);
                return None;
            }
        };

        match decode_unverified(&token) {
            Ok(claims) if claims.is_expired_at(Utc::now()) => {
                log::info!("Stored session expired; clearing it");
                self.discard_session();
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Stored session is unreadable: {}", e);
                self.discard_session();
                return None;
            }
        }

        match self.api.verify(&token).await {
            Ok(user) => Some(user),
            Err(e) => {
                log::warn!("Session verification failed: {}", e);
                self.discard_session();
                None
            }
        }
    }

    /// Forget the session; no request is made
    pub fn logout(&self) -> ClientResult<()> {
        self.store.clear()
    }

    /// Whether a token is currently stored
    pub fn has_session(&self) -> bool {
        matches!(self.store.load(), Ok(Some(_)))
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> ClientResult<User> {
        let token = self.stored_token()?;
        self.api.update_profile(&token, &update).await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> ClientResult<String> {
        let token = self.stored_token()?;
        if current_password.is_empty() || new_password.is_empty() {
            return Err(ClientError::Validation(
                "Current and new password are required".to_string(),
            ));
        }

        self.api
            .change_password(
                &token,
                &ChangePasswordRequest {
                    current_password: current_password.to_string(),
                    new_password: new_password.to_string(),
                },
            )
            .await
    }

    pub async fn request_password_reset(&self, email: &str) -> ClientResult<String> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ClientError::Validation("Email is required".to_string()));
        }

        self.api
            .request_password_reset(&PasswordResetRequest {
                email: email.to_string(),
            })
            .await
    }

    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> ClientResult<String> {
        self.api
            .confirm_password_reset(&PasswordResetConfirm {
                token: token.trim().to_string(),
                new_password: new_password.to_string(),
            })
            .await
    }

    pub async fn verify_email(&self, token: &str) -> ClientResult<String> {
        self.api
            .verify_email(&EmailVerificationRequest {
                token: token.trim().to_string(),
            })
            .await
    }

    fn stored_token(&self) -> ClientResult<String> {
        self.store.load()?.ok_or(ClientError::NotAuthenticated)
    }

    fn discard_session(&self) {
        if let Err(e) = self.store.clear() {
            log::warn!("Could not clear stored session: {}", e);
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
