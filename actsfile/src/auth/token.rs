//! Signed session token codec.
//!
//! Tokens are HS256 JWTs carrying the subject id, the account email, the
//! purpose the token was minted for and an absolute expiry. Expiry is checked
//! by the codec itself against an explicit instant, with no leeway, so a token
//! is valid strictly before `exp` and expired from `exp` onwards.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::UserId;

/// Token-level failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature, encoding or claim structure is invalid
    #[error("Malformed token")]
    MalformedToken,

    /// `exp` is not in the future
    #[error("Token expired")]
    Expired,

    /// Token could not be produced
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Session,
    EmailVerification,
    PasswordReset,
}

/// Claims carried by every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,
    pub email: String,
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    /// Absolute expiry instant
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the token is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// Issues and parses signed tokens
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec keyed by `secret`
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced in `parse_at` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a session token for `subject` expiring `ttl` from now
    pub fn issue(&self, subject: UserId, email: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(TokenPurpose::Session, subject, email, ttl, Utc::now())
    }

    /// Issue a token for an arbitrary purpose
    pub fn issue_for(
        &self,
        purpose: TokenPurpose,
        subject: UserId,
        email: &str,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(purpose, subject, email, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    ///
    /// `ttl` is truncated to whole seconds with a floor of one second, and
    /// `iat` is `now` truncated to the second, so `exp - iat == ttl`.
    pub fn issue_at(
        &self,
        purpose: TokenPurpose,
        subject: UserId,
        email: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let ttl_secs = ttl.num_seconds().max(1);
        let claims = TokenClaims {
            sub: subject,
            email: email.to_string(),
            purpose,
            iat,
            exp: iat.saturating_add(ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Parse and validate a token against the current time
    pub fn parse(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.parse_at(token, Utc::now())
    }

    /// Parse and validate a token against `now`
    ///
    /// # Errors
    ///
    /// * `TokenError::MalformedToken` - bad encoding, signature or claims
    /// * `TokenError::Expired` - `now` is at or past the token's expiry
    pub fn parse_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::MalformedToken)?;

        if data.claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

/// Read a token's claims without checking its signature.
///
/// Clients hold no signing secret; they use this only to drop tokens that
/// have already expired before spending a round trip on them. Never use the
/// result for an authorization decision.
pub fn decode_unverified(token: &str) -> Result<TokenClaims, TokenError> {
    jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
        .map(|data| data.claims)
        .map_err(|_| TokenError::MalformedToken)
}
