//! Configuration types for auth service

use std::time::Duration;

use crate::crypto::SigningSecret;
use crate::AuthError;

/// Longest accepted lifetime for bearer and reset tokens
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

fn checked_ttl(name: &str, ttl: Duration) -> Result<chrono::Duration, AuthError> {
    if ttl.is_zero() || ttl > MAX_TOKEN_TTL {
        return Err(AuthError::Configuration(format!(
            "{name} lifetime must be between 1 second and {} days",
            MAX_TOKEN_TTL.as_secs() / 86_400
        )));
    }
    chrono::Duration::from_std(ttl)
        .map_err(|e| AuthError::Configuration(format!("{name} lifetime: {e}")))
}

/// Auth service configuration
///
/// Built once at startup and passed by value into the components that
/// need it; nothing reads configuration from globals.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign bearer tokens
    pub jwt_secret: SigningSecret,
    /// Bearer token lifetime
    pub token_ttl: chrono::Duration,
    /// Password reset token lifetime
    pub reset_token_ttl: chrono::Duration,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Upper bound on a single hash or verify call
    pub hash_timeout: Duration,
}

impl AuthConfig {
    /// Create a new auth config.
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] if the secret is shorter than
    /// [`SigningSecret::MIN_KEY_LENGTH`] bytes.
    pub fn try_new(jwt_secret: impl AsRef<[u8]>) -> Result<Self, AuthError> {
        let jwt_secret =
            SigningSecret::new(jwt_secret).map_err(|e| AuthError::Configuration(e.to_string()))?;

        Ok(Self {
            jwt_secret,
            token_ttl: chrono::Duration::hours(24),
            reset_token_ttl: chrono::Duration::hours(1),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            hash_timeout: Duration::from_secs(10),
        })
    }

    /// Set bearer token lifetime.
    ///
    /// # Errors
    /// Returns [`AuthError::Configuration`] for a zero lifetime or one longer
    /// than [`MAX_TOKEN_TTL`].
    pub fn with_token_ttl(mut self, ttl: Duration) -> Result<Self, AuthError> {
        self.token_ttl = checked_ttl("token", ttl)?;
        Ok(self)
    }

    /// Set reset token lifetime.
    ///
    /// # Errors
    /// Same bounds as [`AuthConfig::with_token_ttl`].
    pub fn with_reset_token_ttl(mut self, ttl: Duration) -> Result<Self, AuthError> {
        self.reset_token_ttl = checked_ttl("reset token", ttl)?;
        Ok(self)
    }

    /// Set bcrypt cost
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Set hashing timeout
    pub fn with_hash_timeout(mut self, timeout: Duration) -> Self {
        self.hash_timeout = timeout;
        self
    }
}
