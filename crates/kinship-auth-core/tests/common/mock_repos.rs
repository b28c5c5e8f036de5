//! Mock repositories for testing

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use kinship_db::{
    CreatePasswordResetToken, CreateUser, DbError, DbResult, PasswordResetRepository,
    PasswordResetTokenRow, UserRepository, UserRow,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// In-memory user repository for testing
///
/// Email and username uniqueness is enforced on insert, the same way the
/// database constraints do.
#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<DashMap<Uuid, UserRow>>,
    by_email: Arc<DashMap<String, Uuid>>,
    by_username: Arc<DashMap<String, Uuid>>,
    interests: Arc<DashMap<Uuid, Vec<i32>>>,
    fail_interests: Arc<AtomicBool>,
    hide_from_lookup: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `add_interests` fail
    pub fn fail_interests(&self, fail: bool) {
        self.fail_interests.store(fail, Ordering::SeqCst);
    }

    /// Make `find_by_email` miss, as if a concurrent insert had not landed yet
    pub fn hide_from_lookup(&self, hide: bool) {
        self.hide_from_lookup.store(hide, Ordering::SeqCst);
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn get(&self, id: Uuid) -> Option<UserRow> {
        self.users.get(&id).map(|r| r.value().clone())
    }

    pub fn get_by_email(&self, email: &str) -> Option<UserRow> {
        self.by_email
            .get(email)
            .and_then(|id| self.users.get(id.value()).map(|r| r.value().clone()))
    }

    pub fn interests_of(&self, id: Uuid) -> Vec<i32> {
        self.interests
            .get(&id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    pub fn set_active(&self, id: Uuid, active: bool) {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.is_active = active;
        }
    }

    /// Overwrite the stored hash without going through the hasher
    pub fn set_password_hash(&self, id: Uuid, hash: &str) {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.password_hash = hash.to_string();
        }
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        if self.hide_from_lookup.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.get_by_email(email))
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => {
                return Err(DbError::UniqueViolation("users_email_key".to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }

        match self.by_username.entry(user.username.clone()) {
            Entry::Occupied(_) => {
                self.by_email.remove(&user.email);
                return Err(DbError::UniqueViolation("users_username_key".to_string()));
            }
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }

        let now = Utc::now();
        let row = UserRow {
            id: user.id,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: None,
            avatar_url: None,
            is_verified: user.is_verified,
            is_active: user.is_active,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> DbResult<()> {
        let mut user = self.users.get_mut(&id).ok_or(DbError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn add_interests(&self, user_id: Uuid, interest_ids: &[i32]) -> DbResult<()> {
        if self.fail_interests.load(Ordering::SeqCst) {
            return Err(DbError::NotFound);
        }
        let mut entry = self.interests.entry(user_id).or_default();
        for id in interest_ids {
            if !entry.contains(id) {
                entry.push(*id);
            }
        }
        Ok(())
    }
}

/// In-memory password reset token repository for testing
#[derive(Default, Clone)]
pub struct MockPasswordResetRepository {
    tokens: Arc<DashMap<Uuid, PasswordResetTokenRow>>,
    by_hash: Arc<DashMap<String, Uuid>>,
    fail_mark_used: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockPasswordResetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens_for(&self, user_id: Uuid) -> Vec<PasswordResetTokenRow> {
        self.tokens
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect()
    }

    /// Move every stored token's expiry into the past
    pub fn expire_all(&self) {
        for mut row in self.tokens.iter_mut() {
            row.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }

    /// Make `mark_used` fail
    pub fn fail_mark_used(&self, fail: bool) {
        self.fail_mark_used.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PasswordResetRepository for MockPasswordResetRepository {
    async fn create(&self, token: CreatePasswordResetToken) -> DbResult<PasswordResetTokenRow> {
        match self.by_hash.entry(token.token_hash.clone()) {
            Entry::Occupied(_) => {
                return Err(DbError::UniqueViolation(
                    "password_reset_tokens_token_hash_key".to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(token.id);
            }
        }

        let row = PasswordResetTokenRow {
            id: token.id,
            user_id: token.user_id,
            token_hash: token.token_hash,
            expires_at: token.expires_at,
            used: false,
            created_at: Utc::now(),
        };
        self.tokens.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_valid_by_token_hash(
        &self,
        token_hash: &str,
    ) -> DbResult<Option<PasswordResetTokenRow>> {
        let now = Utc::now();
        Ok(self
            .by_hash
            .get(token_hash)
            .and_then(|id| self.tokens.get(id.value()).map(|r| r.value().clone()))
            .filter(|row| !row.used && row.expires_at > now))
    }

    async fn mark_used(&self, id: Uuid) -> DbResult<()> {
        if self.fail_mark_used.load(Ordering::SeqCst) {
            return Err(DbError::NotFound);
        }
        if let Some(mut row) = self.tokens.get_mut(&id) {
            row.used = true;
        }
        Ok(())
    }
}
