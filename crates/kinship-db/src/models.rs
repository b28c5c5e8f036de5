//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use kinship_types::{UserId, UserProfile};
use sqlx::FromRow;
use uuid::Uuid;

/// User row from the database
#[derive(Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for UserRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRow")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("is_verified", &self.is_verified)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

/// Password reset token row from the database
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetTokenRow {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 of the raw token, hex encoded
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// Outward view without the password hash
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id(),
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            bio: self.bio.clone(),
            avatar_url: self.avatar_url.clone(),
            is_verified: self.is_verified,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl PasswordResetTokenRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }

    /// Consumable only while unused and before expiry
    pub fn is_consumable_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            username: "alice".to_string(),
            password_hash: "$2b$12$secretsecretsecretsecret".to_string(),
            first_name: None,
            last_name: None,
            bio: None,
            avatar_url: None,
            is_verified: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let user = sample_user();
        let dbg = format!("{user:?}");
        assert!(dbg.contains("alice"));
        assert!(!dbg.contains("$2b$12$"));
    }

    #[test]
    fn test_profile_conversion_keeps_identity() {
        let user = sample_user();
        let profile = user.to_profile();
        assert_eq!(profile.id, user.user_id());
        assert_eq!(profile.email, user.email);
    }

    #[test]
    fn test_reset_token_consumable_window() {
        let now = Utc::now();
        let mut row = PasswordResetTokenRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "ab".repeat(32),
            expires_at: now + chrono::Duration::hours(1),
            used: false,
            created_at: now,
        };
        assert!(row.is_consumable_at(now));
        assert!(!row.is_consumable_at(now + chrono::Duration::hours(1)));

        row.used = true;
        assert!(!row.is_consumable_at(now));
    }
}
