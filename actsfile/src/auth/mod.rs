//! Authentication module providing registration, login, and session management.
//!
//! This module implements:
//! - Argon2id password hashing with server-side pepper
//! - Signed HS256 session tokens (7-day expiry by default)
//! - Email verification and password reset tokens delivered through a notifier
//!
//! ## Example
//!
//! ```no_run
//! use actsfile::auth::{AuthManager, LogNotifier, RegisterRequest};
//! use actsfile::db::InMemoryUserRepository;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(InMemoryUserRepository::new()),
//!         Arc::new(LogNotifier),
//!         "secret_pepper".to_string(),
//!         "jwt_secret".to_string(),
//!     );
//!
//!     let request = RegisterRequest {
//!         name: "Amina".to_string(),
//!         email: "amina@example.com".to_string(),
//!         password: "longenough".to_string(),
//!         phone: None,
//!         location: Some("Accra, Ghana".to_string()),
//!         agree_to_terms: true,
//!     };
//!
//!     let user = auth.register(request).await?;
//!     println!("Registered user: {}", user.email);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod notifier;
pub mod password;
pub mod token;

pub use errors::{AuthError, AuthResult};
pub use manager::{AuthManager, TokenLifetimes, is_valid_email};
pub use models::{
    ChangePasswordRequest, EmailVerificationRequest, LoginRequest, PasswordResetConfirm,
    PasswordResetRequest, Preferences, PreferencesUpdate, ProfileUpdate, RegisterRequest, User,
    UserId, UserRecord, Visibility,
};
pub use notifier::{AuthNotifier, LogNotifier, MemoryNotifier, Notice, NoticeKind};
pub use password::{CredentialVerifier, MIN_PASSWORD_LEN};
pub use token::{TokenClaims, TokenCodec, TokenError, TokenPurpose, decode_unverified};
