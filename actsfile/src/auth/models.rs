//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User ID type
pub type UserId = Uuid;

/// Who may see a user's profile and acts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Friends,
    Private,
}

/// Per-user preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub privacy: Visibility,
    pub notifications: bool,
    pub newsletter: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            privacy: Visibility::Public,
            notifications: true,
            newsletter: true,
        }
    }
}

/// User model as exposed to clients (never carries the credential)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub join_date: DateTime<Utc>,
    pub is_verified: bool,
    pub preferences: Preferences,
}

/// Stored user row: the public user plus its password hash
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub agree_to_terms: bool,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Partial preferences update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newsletter: Option<bool>,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<PreferencesUpdate>,
}

impl ProfileUpdate {
    /// Apply the present fields to `user`
    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name.trim().to_string();
        }
        if let Some(phone) = self.phone {
            user.phone = non_empty(phone);
        }
        if let Some(avatar) = self.avatar {
            user.avatar = non_empty(avatar);
        }
        if let Some(bio) = self.bio {
            user.bio = non_empty(bio);
        }
        if let Some(location) = self.location {
            user.location = non_empty(location);
        }
        if let Some(prefs) = self.preferences {
            if let Some(privacy) = prefs.privacy {
                user.preferences.privacy = privacy;
            }
            if let Some(notifications) = prefs.notifications {
                user.preferences.notifications = notifications;
            }
            if let Some(newsletter) = prefs.newsletter {
                user.preferences.newsletter = newsletter;
            }
        }
    }
}

/// Change password request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Password reset request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub email: String,
}

/// Password reset confirmation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

/// Email verification request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailVerificationRequest {
    #[serde(default)]
    pub token: String,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "amina@example.com".to_string(),
            name: "Amina".to_string(),
            phone: Some("+233123456789".to_string()),
            avatar: None,
            bio: None,
            location: Some("Accra, Ghana".to_string()),
            join_date: Utc::now(),
            is_verified: true,
            preferences: Preferences::default(),
        }
    }

    #[test]
    fn test_user_serializes_camel_case_without_password() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("joinDate").is_some());
        assert!(json.get("isVerified").is_some());
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["preferences"]["privacy"], "public");
    }

    #[test]
    fn test_register_request_reads_agree_to_terms() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@b.com","password":"longenough","agreeToTerms":true}"#,
        )
        .unwrap();
        assert!(request.agree_to_terms);
        assert!(request.phone.is_none());
    }

    #[test]
    fn test_profile_update_only_touches_present_fields() {
        let mut user = sample_user();
        let update = ProfileUpdate {
            bio: Some("Planting trees in Kumasi".to_string()),
            phone: Some("   ".to_string()),
            preferences: Some(PreferencesUpdate {
                privacy: Some(Visibility::Friends),
                ..Default::default()
            }),
            ..Default::default()
        };

        update.apply_to(&mut user);

        assert_eq!(user.name, "Amina");
        assert_eq!(user.bio.as_deref(), Some("Planting trees in Kumasi"));
        assert_eq!(user.phone, None);
        assert_eq!(user.location.as_deref(), Some("Accra, Ghana"));
        assert_eq!(user.preferences.privacy, Visibility::Friends);
        assert!(user.preferences.newsletter);
    }
}
