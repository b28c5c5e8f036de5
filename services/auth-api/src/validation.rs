//! Request body validation
//!
//! Shape checks only. Anything that passes here is handed to the auth
//! service as-is.

use kinship_auth_core::MAX_PASSWORD_BYTES;
use kinship_types::{LoginRequest, PasswordResetConfirm, PasswordResetRequest, RegisterRequest};

use crate::error::ApiError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 100;

/// Validate an email address shape: `local@domain.tld`
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::validation("email", "email is required"));
    }
    if !is_valid_email(email) {
        return Err(ApiError::validation("email", "invalid email format"));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));

    // The top-level label is the part after the last dot
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());

    local_ok && host_ok && tld_ok
}

/// Validate a new password: at least 8 characters and no more than bcrypt
/// can hash in full
pub fn validate_password(field: &'static str, password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation(field, "password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::validation(
            field,
            format!("password must be at least {MIN_PASSWORD_LENGTH} characters long"),
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::validation(
            field,
            format!("password must not exceed {MAX_PASSWORD_BYTES} bytes"),
        ));
    }
    Ok(())
}

/// Validate a username: 3 to 100 letters, digits, underscores or hyphens
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::validation("username", "username is required"));
    }
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(ApiError::validation(
            "username",
            format!("username must be at least {MIN_USERNAME_LENGTH} characters long"),
        ));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::validation(
            "username",
            format!("username must not exceed {MAX_USERNAME_LENGTH} characters"),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::validation(
            "username",
            "username can only contain letters, numbers, underscores, and hyphens",
        ));
    }
    Ok(())
}

/// Reject empty or whitespace-only values
pub fn validate_required(field: &'static str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(field, format!("{field} is required")));
    }
    Ok(())
}

/// Request bodies that can check their own shape
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)?;
        validate_username(&self.username)?;
        validate_password("password", &self.password)
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)?;
        validate_required("password", &self.password)
    }
}

impl Validate for PasswordResetRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)
    }
}

impl Validate for PasswordResetConfirm {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required("token", &self.token)?;
        validate_password("new_password", &self.new_password)
    }
}
