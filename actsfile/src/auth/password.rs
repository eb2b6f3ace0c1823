//! Credential hashing and verification.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::errors::{AuthError, AuthResult};

/// Minimum password length, in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// Argon2id hashing with a server-side pepper
#[derive(Clone)]
pub struct CredentialVerifier {
    pepper: String,
}

impl CredentialVerifier {
    pub fn new(pepper: String) -> Self {
        Self { pepper }
    }

    /// Hash password with Argon2id + pepper
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);

        Ok(Argon2::default()
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Check a submitted password against a stored hash.
    ///
    /// Returns false on mismatch and on a stored value that is not a valid
    /// PHC string.
    pub fn verify(&self, submitted: &str, stored_hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
            return false;
        };
        let peppered = format!("{}{}", submitted, self.pepper);

        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let verifier = CredentialVerifier::new("pepper_for_tests".to_string());
        let hash = verifier.hash("longenough").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verifier.verify("longenough", &hash));
        assert!(!verifier.verify("longenougH", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let verifier = CredentialVerifier::new("pepper_for_tests".to_string());
        let first = verifier.hash("same password").unwrap();
        let second = verifier.hash("same password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_pepper_is_part_of_the_credential() {
        let a = CredentialVerifier::new("pepper_a".to_string());
        let b = CredentialVerifier::new("pepper_b".to_string());
        let hash = a.hash("longenough").unwrap();
        assert!(!b.verify("longenough", &hash));
    }

    #[test]
    fn test_plaintext_stored_value_never_matches() {
        let verifier = CredentialVerifier::new("pepper".to_string());
        assert!(!verifier.verify("password", "password"));
        assert!(!verifier.verify("", ""));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
        // Eight characters, more than eight bytes.
        assert!(validate_password("ñññññññń").is_ok());
    }
}
