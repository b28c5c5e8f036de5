//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// User repository trait
///
/// Email and username uniqueness is enforced by storage: `create` returns
/// [`DbError::UniqueViolation`](crate::DbError::UniqueViolation) on conflict.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by email (exact, case-sensitive match)
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Create a new user
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;

    /// Replace the user's password hash. Unknown ids yield `DbError::NotFound`.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> DbResult<()>;

    /// Attach interest groups; already attached ones are skipped
    async fn add_interests(&self, user_id: Uuid, interest_ids: &[i32]) -> DbResult<()>;
}

/// Create user input
#[derive(Clone)]
pub struct CreateUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
}

impl std::fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Password reset token repository trait
///
/// Rows are never deleted; a token is retired by `mark_used` or by expiry.
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Persist a new reset token
    async fn create(&self, token: CreatePasswordResetToken) -> DbResult<PasswordResetTokenRow>;

    /// Find a token that is unused and not yet expired.
    ///
    /// Unknown, used and expired tokens all yield `None`.
    async fn find_valid_by_token_hash(
        &self,
        token_hash: &str,
    ) -> DbResult<Option<PasswordResetTokenRow>>;

    /// Flip the used flag. Marking an already used token is a no-op.
    async fn mark_used(&self, id: Uuid) -> DbResult<()>;
}

/// Create password reset token input
#[derive(Debug, Clone)]
pub struct CreatePasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}
