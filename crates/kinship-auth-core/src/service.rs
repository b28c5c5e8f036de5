//! Auth service - ties together password hashing, bearer tokens, reset tokens
//! and notifications for the register, login and password reset flows

use kinship_db::{CreateUser, PasswordResetRepository, UserRepository};
use kinship_types::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::AuthConfig, notify::NotificationDispatcher, password::PasswordHasher,
    reset::ResetTokenStore, token::Claims, token::TokenIssuer, AuthError,
};

/// Response to every password reset request, whether or not the email exists
pub const PASSWORD_RESET_REQUESTED: &str =
    "If the email exists, a password reset link has been sent";

/// Response to a successful password reset
pub const PASSWORD_RESET_COMPLETED: &str = "Password has been reset successfully";

/// Authentication service
///
/// Provides:
/// - Registration and login with bearer token issuance
/// - Password reset via single-use emailed tokens
/// - Bearer token validation for protected routes
pub struct AuthService<U: UserRepository, R: PasswordResetRepository> {
    config: AuthConfig,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    reset_tokens: ResetTokenStore<R>,
    notifications: NotificationDispatcher,
    user_repo: Arc<U>,
}

impl<U: UserRepository, R: PasswordResetRepository> AuthService<U, R> {
    /// Create a new auth service
    pub fn new(
        config: AuthConfig,
        user_repo: Arc<U>,
        reset_repo: Arc<R>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            hasher: PasswordHasher::from_config(&config),
            tokens: TokenIssuer::new(&config),
            reset_tokens: ResetTokenStore::new(reset_repo, config.reset_token_ttl),
            notifications,
            user_repo,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // =========================================================================
    // Registration and Login
    // =========================================================================

    /// Register a new user and sign them in.
    ///
    /// The email lookup is only a shortcut; the storage unique constraints
    /// decide duplicates, so a racing insert still yields
    /// [`AuthError::DuplicateUser`].
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AuthError> {
        if self.user_repo.find_by_email(&req.email).await?.is_some() {
            tracing::debug!(email = %req.email, "Registration rejected, email taken");
            return Err(AuthError::DuplicateUser);
        }

        let password_hash = self.hasher.hash(&req.password).await?;

        let user = self
            .user_repo
            .create(CreateUser {
                id: Uuid::new_v4(),
                email: req.email,
                username: req.username,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
                is_verified: false,
                is_active: true,
            })
            .await?;

        if !req.interests.is_empty() {
            // Registration stands even if the interests cannot be attached
            if let Err(e) = self.user_repo.add_interests(user.id, &req.interests).await {
                tracing::warn!(
                    user_id = %user.id,
                    error = %e,
                    "Failed to add user interests"
                );
            }
        }

        let profile = user.to_profile();
        let token = self.tokens.issue(&profile)?;

        self.notifications
            .welcome(profile.email.clone(), profile.username.clone());

        tracing::info!(user_id = %profile.id, "User registered");
        Ok(AuthResponse {
            token,
            user: profile,
        })
    }

    /// Check credentials and issue a bearer token.
    ///
    /// An unknown email and a wrong password fail identically, and both
    /// spend one bcrypt verify.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        let Some(user) = self.user_repo.find_by_email(&req.email).await? else {
            self.hasher.verify_dummy(&req.password).await;
            tracing::debug!("Login failed, unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active {
            tracing::debug!(user_id = %user.id, "Login rejected, account deactivated");
            return Err(AuthError::AccountDeactivated);
        }

        if !self.hasher.verify(&user.password_hash, &req.password).await? {
            tracing::debug!(user_id = %user.id, "Login failed, wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let profile = user.to_profile();
        let token = self.tokens.issue(&profile)?;

        tracing::info!(user_id = %profile.id, "User logged in");
        Ok(AuthResponse {
            token,
            user: profile,
        })
    }

    // =========================================================================
    // Password Reset
    // =========================================================================

    /// Start a password reset.
    ///
    /// Always returns the same message. Unknown emails and internal failures
    /// are only visible in the logs.
    pub async fn request_password_reset(&self, email: &str) -> MessageResponse {
        if let Err(e) = self.try_request_password_reset(email).await {
            tracing::error!(error = %e, "Password reset request failed");
        }
        MessageResponse::new(PASSWORD_RESET_REQUESTED)
    }

    async fn try_request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = self.reset_tokens.create(user.user_id()).await?;
        self.notifications.password_reset(user.email, token);

        tracing::info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    /// Finish a password reset with an emailed token.
    ///
    /// The password is updated before the token is retired. If retiring
    /// fails the new password stays in place and the call still fails.
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, AuthError> {
        let reset = self.reset_tokens.fetch_valid(token).await?;

        let password_hash = self.hasher.hash(new_password).await?;
        self.user_repo
            .update_password(reset.user_id, &password_hash)
            .await?;

        if let Err(e) = self.reset_tokens.mark_used(reset.id).await {
            tracing::error!(
                user_id = %reset.user_id,
                token_id = %reset.id,
                error = %e,
                "Password updated but reset token could not be retired"
            );
            return Err(e);
        }

        tracing::info!(user_id = %reset.user_id, "Password reset completed");
        Ok(MessageResponse::new(PASSWORD_RESET_COMPLETED))
    }

    // =========================================================================
    // Token Validation
    // =========================================================================

    /// Validate a bearer token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.validate(token)
    }
}

impl<U: UserRepository, R: PasswordResetRepository> std::fmt::Debug for AuthService<U, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .field("tokens", &self.tokens)
            .field("reset_tokens", &self.reset_tokens)
            .finish_non_exhaustive()
    }
}
