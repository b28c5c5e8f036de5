//! Single-use password reset tokens
//!
//! The raw token goes to the user; only its SHA-256 digest is stored.
//! Lookups never say why a token was rejected.

use std::sync::Arc;

use chrono::Utc;
use kinship_db::{CreatePasswordResetToken, PasswordResetRepository, PasswordResetTokenRow};
use kinship_types::UserId;
use uuid::Uuid;

use crate::crypto::{generate_reset_token, hash_token};
use crate::AuthError;

/// Creates, fetches and retires reset tokens
pub struct ResetTokenStore<R: PasswordResetRepository> {
    repo: Arc<R>,
    ttl: chrono::Duration,
}

impl<R: PasswordResetRepository> Clone for ResetTokenStore<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            ttl: self.ttl,
        }
    }
}

impl<R: PasswordResetRepository> ResetTokenStore<R> {
    /// Create a new store with the given token lifetime
    pub fn new(repo: Arc<R>, ttl: chrono::Duration) -> Self {
        Self { repo, ttl }
    }

    /// Issue a new token for the user and return the raw value.
    ///
    /// Earlier outstanding tokens for the same user stay valid.
    pub async fn create(&self, user_id: UserId) -> Result<String, AuthError> {
        let token = generate_reset_token();
        let expires_at = Utc::now() + self.ttl;

        self.repo
            .create(CreatePasswordResetToken {
                id: Uuid::new_v4(),
                user_id: user_id.0,
                token_hash: hash_token(&token),
                expires_at,
            })
            .await?;

        tracing::debug!(%user_id, %expires_at, "Password reset token created");
        Ok(token)
    }

    /// Fetch a token that is still consumable.
    ///
    /// Unknown, used and expired tokens all fail with
    /// [`AuthError::InvalidOrExpiredToken`].
    pub async fn fetch_valid(&self, token: &str) -> Result<PasswordResetTokenRow, AuthError> {
        let row = self
            .repo
            .find_valid_by_token_hash(&hash_token(token))
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)?;

        if !row.is_consumable_at(Utc::now()) {
            return Err(AuthError::InvalidOrExpiredToken);
        }

        Ok(row)
    }

    /// Retire a token. Retiring twice has no further effect.
    pub async fn mark_used(&self, id: Uuid) -> Result<(), AuthError> {
        self.repo.mark_used(id).await?;
        Ok(())
    }
}

impl<R: PasswordResetRepository> std::fmt::Debug for ResetTokenStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetTokenStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
