//! Repository trait definitions for testability and dependency injection.
//!
//! The auth layer talks to users only through [`UserRepository`]. The
//! in-memory implementation is the only one shipped; it is reset whenever the
//! process restarts.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::auth::{AuthError, AuthResult, User, UserId, UserRecord};

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; fails with `EmailTaken` if the email is in use
    async fn create_user(&self, record: UserRecord) -> AuthResult<User>;

    /// Find user by email, ignoring case
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserRecord>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<UserRecord>>;

    /// Replace the public part of a user
    async fn update_user(&self, user: User) -> AuthResult<User>;

    /// Replace a user's password hash
    async fn update_password_hash(&self, user_id: UserId, password_hash: String) -> AuthResult<()>;

    /// Mark a user's email as verified
    async fn mark_verified(&self, user_id: UserId) -> AuthResult<User>;

    /// Number of stored users
    async fn count(&self) -> AuthResult<usize>;
}

/// `UserRepository` backed by a map behind an async lock
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, record: UserRecord) -> AuthResult<User> {
        let mut users = self.users.write().await;

        // Check and insert under the same write lock.
        let taken = users
            .values()
            .any(|existing| existing.user.email.eq_ignore_ascii_case(&record.user.email));
        if taken {
            return Err(AuthError::EmailTaken);
        }

        let user = record.user.clone();
        users.insert(user.id, record);
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|record| record.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn update_user(&self, user: User) -> AuthResult<User> {
        let mut users = self.users.write().await;
        let record = users.get_mut(&user.id).ok_or(AuthError::UserNotFound)?;
        record.user = user.clone();
        Ok(user)
    }

    async fn update_password_hash(&self, user_id: UserId, password_hash: String) -> AuthResult<()> {
        let mut users = self.users.write().await;
        let record = users.get_mut(&user_id).ok_or(AuthError::UserNotFound)?;
        record.password_hash = password_hash;
        Ok(())
    }

    async fn mark_verified(&self, user_id: UserId) -> AuthResult<User> {
        let mut users = self.users.write().await;
        let record = users.get_mut(&user_id).ok_or(AuthError::UserNotFound)?;
        record.user.is_verified = true;
        Ok(record.user.clone())
    }

    async fn count(&self) -> AuthResult<usize> {
        Ok(self.users.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Preferences;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(email: &str) -> UserRecord {
        UserRecord {
            user: User {
                id: Uuid::new_v4(),
                email: email.to_string(),
                name: "Kwame".to_string(),
                phone: None,
                avatar: None,
                bio: None,
                location: None,
                join_date: Utc::now(),
                is_verified: false,
                preferences: Preferences::default(),
            },
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    #[tokio::test]
    async fn test_email_uniqueness_is_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(record("kwame@example.com")).await.unwrap();

        let result = repo.create_user(record("KWAME@Example.com")).await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_email_ignores_case() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create_user(record("kwame@example.com")).await.unwrap();

        let found = repo.find_by_email("Kwame@EXAMPLE.com").await.unwrap().unwrap();
        assert_eq!(found.user.id, created.id);
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_verified_and_update_password() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create_user(record("ama@example.com")).await.unwrap();
        assert!(!created.is_verified);

        let verified = repo.mark_verified(created.id).await.unwrap();
        assert!(verified.is_verified);

        repo.update_password_hash(created.id, "new-hash".to_string())
            .await
            .unwrap();
        let stored = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new-hash");
        assert!(stored.user.is_verified);
    }

    #[tokio::test]
    async fn test_updates_on_missing_user_fail() {
        let repo = InMemoryUserRepository::new();
        let missing = Uuid::new_v4();

        assert!(matches!(repo.mark_verified(missing).await, Err(AuthError::UserNotFound)));
        assert!(matches!(
            repo.update_password_hash(missing, "x".to_string()).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
