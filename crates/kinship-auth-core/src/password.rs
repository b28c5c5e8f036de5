//! Password hashing with bcrypt
//!
//! bcrypt is deliberately slow, so every call runs on the blocking thread
//! pool and is bounded by the configured timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;

use crate::{AuthConfig, AuthError};

/// Longest password bcrypt reads in full; anything past this is ignored by
/// the algorithm, so longer input is refused.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Plaintext used to build the dummy hash for unknown-user logins
const DUMMY_PASSWORD: &str = "kinship-timing-equalizer";

/// Salted one-way password hasher
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    timeout: Duration,
    /// Hash verified against when no user matched, so that path costs the
    /// same as a real password check
    dummy_hash: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    /// Create a hasher with an explicit bcrypt cost and per-call timeout
    pub fn new(cost: u32, timeout: Duration) -> Self {
        Self {
            cost,
            timeout,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Create a hasher from auth config
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.bcrypt_cost, config.hash_timeout)
    }

    /// bcrypt cost in use
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    /// Returns [`AuthError::Internal`] if the password is longer than
    /// [`MAX_PASSWORD_BYTES`], if bcrypt rejects the input or cost, or if
    /// hashing exceeds the timeout.
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        if password.len() > MAX_PASSWORD_BYTES {
            tracing::error!(len = password.len(), "Password too long to hash");
            return Err(AuthError::Internal(format!(
                "password exceeds {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        let password = password.to_owned();
        let cost = self.cost;

        self.run_blocking("hash", move || bcrypt::hash(password, cost))
            .await?
            .map_err(|e| {
                tracing::error!("Failed to hash password: {}", e);
                AuthError::Internal("failed to hash password".to_string())
            })
    }

    /// Check a password against a stored hash.
    ///
    /// # Errors
    /// A stored hash bcrypt cannot parse is [`AuthError::Internal`], never a
    /// mismatch.
    pub async fn verify(&self, hashed: &str, password: &str) -> Result<bool, AuthError> {
        // Nothing this long was ever hashed; bcrypt would compare a prefix
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        let password = password.to_owned();
        let hashed = hashed.to_owned();

        let result = self
            .run_blocking("verify", move || bcrypt::verify(password, &hashed))
            .await?;

        result.map_err(|e| {
            tracing::error!("Stored password hash could not be parsed: {}", e);
            AuthError::Internal("stored password hash is unreadable".to_string())
        })
    }

    /// Spend one verify's worth of work against a throwaway hash.
    ///
    /// Failures are swallowed; this exists only to make the
    /// unknown-account path indistinguishable by timing.
    pub async fn verify_dummy(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD))
            .await;

        match dummy {
            Ok(hash) => {
                let _ = self.verify(hash, password).await;
            }
            Err(e) => tracing::debug!(error = %e, "Dummy hash unavailable"),
        }
    }

    async fn run_blocking<T, F>(&self, op: &'static str, f: F) -> Result<T, AuthError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        match tokio::time::timeout(self.timeout, tokio::task::spawn_blocking(f)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!(op, "Password {} task failed: {}", op, e);
                Err(AuthError::Internal(format!("password {op} failed")))
            }
            Err(_) => {
                tracing::error!(op, timeout = ?self.timeout, "Password {} timed out", op);
                Err(AuthError::Internal(format!("password {op} timed out")))
            }
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
