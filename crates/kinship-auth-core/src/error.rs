//! Auth errors

use thiserror::Error;

/// Authentication errors
///
/// `InvalidCredentials` and `InvalidOrExpiredToken` each cover several
/// underlying causes and carry a fixed message, so callers cannot tell the
/// causes apart.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Email or username is already registered
    #[error("user with this email or username already exists")]
    DuplicateUser,

    /// Unknown email or wrong password
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Account exists but has been deactivated
    #[error("account is deactivated")]
    AccountDeactivated,

    /// Bearer or reset token is malformed, forged, expired or already used
    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error (hashing, signing)
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials => 401,
            Self::AccountDeactivated => 403,
            Self::DuplicateUser => 409,
            Self::InvalidOrExpiredToken => 400,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateUser => "DUPLICATE_USER",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            Self::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error is a server-side failure rather than a caller error
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_)
        )
    }
}

impl From<kinship_db::DbError> for AuthError {
    fn from(err: kinship_db::DbError) -> Self {
        if let kinship_db::DbError::UniqueViolation(constraint) = &err {
            tracing::debug!(%constraint, "Unique constraint rejected write");
            return Self::DuplicateUser;
        }
        tracing::error!("Database error: {}", err);
        Self::Database(err.to_string())
    }
}
