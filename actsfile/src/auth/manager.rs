//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{
        ChangePasswordRequest, LoginRequest, PasswordResetConfirm, Preferences, ProfileUpdate,
        RegisterRequest, User, UserId, UserRecord,
    },
    notifier::AuthNotifier,
    password::{CredentialVerifier, validate_password},
    token::{TokenClaims, TokenCodec, TokenPurpose},
};
use crate::db::UserRepository;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Lifetimes of the tokens minted by [`AuthManager`]
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub session: Duration,
    pub email_verification: Duration,
    pub password_reset: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            session: Duration::days(7),
            email_verification: Duration::hours(24),
            password_reset: Duration::hours(1),
        }
    }
}

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn AuthNotifier>,
    verifier: CredentialVerifier,
    codec: TokenCodec,
    lifetimes: TokenLifetimes,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - User repository
    /// * `notifier` - Delivery of verification and reset tokens
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for token signing
    pub fn new(
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn AuthNotifier>,
        pepper: String,
        jwt_secret: String,
    ) -> Self {
        Self {
            users,
            notifier,
            verifier: CredentialVerifier::new(pepper),
            codec: TokenCodec::new(&jwt_secret),
            lifetimes: TokenLifetimes::default(),
        }
    }

    /// Override the default token lifetimes
    pub fn with_lifetimes(mut self, lifetimes: TokenLifetimes) -> Self {
        self.lifetimes = lifetimes;
        self
    }

    /// Token codec used for every token this manager issues
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Register a new, unverified user and send them a verification token
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Missing fields, terms not accepted, bad email
    /// * `AuthError::WeakPassword` - Password shorter than the minimum
    /// * `AuthError::EmailTaken` - Email already exists
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        let name = request.name.trim();
        let email = request.email.trim();

        if name.is_empty() || email.is_empty() || request.password.trim().is_empty() {
            return Err(AuthError::Validation(
                "Name, email, and password are required".to_string(),
            ));
        }

        if !request.agree_to_terms {
            return Err(AuthError::Validation(
                "You must agree to the terms and conditions".to_string(),
            ));
        }

        if !is_valid_email(email) {
            return Err(AuthError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }

        validate_password(&request.password)?;

        // Cheap pre-check; the repository enforces uniqueness atomically.
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.verifier.hash(&request.password)?;
        let record = UserRecord {
            user: User {
                id: Uuid::new_v4(),
                email: email.to_lowercase(),
                name: name.to_string(),
                phone: trimmed(request.phone),
                avatar: None,
                bio: None,
                location: trimmed(request.location),
                join_date: Utc::now(),
                is_verified: false,
                preferences: Preferences::default(),
            },
            password_hash,
        };

        let user = self.users.create_user(record).await?;

        let token = self.codec.issue_for(
            TokenPurpose::EmailVerification,
            user.id,
            &user.email,
            self.lifetimes.email_verification,
        )?;
        self.notifier.send_verification(&user, &token).await;

        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Create a user that is already verified (seed/demo accounts)
    pub async fn seed_verified_user(&self, name: &str, email: &str, password: &str) -> AuthResult<User> {
        let user = self
            .register(RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                phone: None,
                location: None,
                agree_to_terms: true,
            })
            .await?;
        self.users.mark_verified(user.id).await
    }

    /// Login a user
    ///
    /// # Returns
    ///
    /// * `AuthResult<(User, String)>` - User and session token
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Missing email/password or malformed email
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password
    /// * `AuthError::EmailNotVerified` - Correct credentials, unverified email
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, String)> {
        let email = request.email.trim();
        // Passwords are hashed verbatim at registration, so they are compared verbatim
        let password = request.password.as_str();

        if email.is_empty() || password.trim().is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        if !is_valid_email(email) {
            return Err(AuthError::Validation("Invalid email format".to_string()));
        }

        let record = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verifier.verify(password, &record.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        if !record.user.is_verified {
            return Err(AuthError::EmailNotVerified);
        }

        let token = self
            .codec
            .issue(record.user.id, &record.user.email, self.lifetimes.session)?;

        Ok((record.user, token))
    }

    /// Verify a session token and return the user it belongs to
    ///
    /// # Errors
    ///
    /// * `AuthError::Token` - Malformed or expired token
    /// * `AuthError::WrongTokenPurpose` - Not a session token
    /// * `AuthError::UserNotFound` - Subject no longer exists
    pub async fn verify_session(&self, token: &str) -> AuthResult<User> {
        let claims = self.claims_for(token, TokenPurpose::Session)?;
        self.load_user(claims.sub).await
    }

    /// Apply a partial profile update
    pub async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> AuthResult<User> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(AuthError::Validation("Name cannot be empty".to_string()));
            }
        }

        let mut user = self.load_user(user_id).await?;
        update.apply_to(&mut user);
        self.users.update_user(user).await
    }

    /// Change password after re-checking the current one
    ///
    /// # Errors
    ///
    /// * `AuthError::IncorrectPassword` - Current password does not match
    /// * `AuthError::WeakPassword` - New password too short
    pub async fn change_password(
        &self,
        user_id: UserId,
        request: ChangePasswordRequest,
    ) -> AuthResult<()> {
        if request.current_password.is_empty() || request.new_password.is_empty() {
            return Err(AuthError::Validation(
                "Current and new password are required".to_string(),
            ));
        }

        let record = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self
            .verifier
            .verify(&request.current_password, &record.password_hash)
        {
            return Err(AuthError::IncorrectPassword);
        }

        validate_password(&request.new_password)?;

        let hash = self.verifier.hash(&request.new_password)?;
        self.users.update_password_hash(user_id, hash).await
    }

    /// Start a password reset.
    ///
    /// Succeeds whether or not the account exists so callers cannot probe for
    /// registered emails.
    pub async fn request_password_reset(&self, email: &str) -> AuthResult<()> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }
        if !is_valid_email(email) {
            return Err(AuthError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }

        match self.users.find_by_email(email).await? {
            Some(record) => {
                let token = self.codec.issue_for(
                    TokenPurpose::PasswordReset,
                    record.user.id,
                    &record.user.email,
                    self.lifetimes.password_reset,
                )?;
                self.notifier.send_password_reset(&record.user, &token).await;
            }
            None => log::debug!("Password reset requested for unknown email"),
        }

        Ok(())
    }

    /// Finish a password reset with the token from the reset notice
    pub async fn confirm_password_reset(&self, request: PasswordResetConfirm) -> AuthResult<()> {
        let claims = self.claims_for(&request.token, TokenPurpose::PasswordReset)?;
        validate_password(&request.new_password)?;

        let hash = self.verifier.hash(&request.new_password)?;
        self.users.update_password_hash(claims.sub, hash).await
    }

    /// Mark an email as verified with the token from the verification notice
    pub async fn verify_email(&self, token: &str) -> AuthResult<User> {
        let claims = self.claims_for(token, TokenPurpose::EmailVerification)?;
        self.users.mark_verified(claims.sub).await
    }

    /// Cheap liveness probe of the backing store
    pub async fn health_check(&self) -> AuthResult<usize> {
        self.users.count().await
    }

    fn claims_for(&self, token: &str, purpose: TokenPurpose) -> AuthResult<TokenClaims> {
        let claims = self.codec.parse(token)?;
        if claims.purpose != purpose {
            return Err(AuthError::WrongTokenPurpose);
        }
        Ok(claims)
    }

    async fn load_user(&self, user_id: UserId) -> AuthResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|record| record.user)
            .ok_or(AuthError::UserNotFound)
    }
}

/// Accepts `local@domain.tld` with no whitespace and exactly one `@`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("scholar@mail.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("plainaddress"));
    }

    #[test]
    fn test_default_lifetimes() {
        let lifetimes = TokenLifetimes::default();
        assert_eq!(lifetimes.session, Duration::days(7));
        assert!(lifetimes.password_reset < lifetimes.email_verification);
    }
}
