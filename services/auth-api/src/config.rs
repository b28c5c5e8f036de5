//! Configuration for the Auth API service.

use kinship_auth_core::{AuthConfig, SmtpConfig};
use std::time::Duration;

/// Auth API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Deployment environment name (development, production, ...)
    pub environment: String,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Outbound mail settings
    pub smtp: SmtpConfig,

    /// Capacity of the notification queue
    pub notification_queue_size: usize,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        // Database
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        // Server port
        let http_port = get("HTTP_PORT")
            .or_else(|| get("PORT"))
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        // Signing secret (minimum 32 bytes)
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid(
                "JWT_SECRET must be at least 32 characters",
            ));
        }

        // Token lifetimes
        let token_ttl_hours: u64 = get("TOKEN_TTL_HOURS")
            .unwrap_or_else(|| "24".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("TOKEN_TTL_HOURS"))?;

        let reset_token_ttl_minutes: u64 = get("RESET_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|| "60".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("RESET_TOKEN_TTL_MINUTES"))?;

        let token_ttl = token_ttl_hours
            .checked_mul(3600)
            .map(Duration::from_secs)
            .ok_or(ConfigError::Invalid("TOKEN_TTL_HOURS"))?;
        let reset_token_ttl = reset_token_ttl_minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or(ConfigError::Invalid("RESET_TOKEN_TTL_MINUTES"))?;

        let mut auth = AuthConfig::try_new(&jwt_secret)
            .and_then(|auth| auth.with_token_ttl(token_ttl))
            .and_then(|auth| auth.with_reset_token_ttl(reset_token_ttl))
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?;

        if let Some(cost) = get("BCRYPT_COST") {
            let cost: u32 = cost
                .parse()
                .map_err(|_| ConfigError::Invalid("BCRYPT_COST"))?;
            if !(4..=31).contains(&cost) {
                return Err(ConfigError::Invalid("BCRYPT_COST must be between 4 and 31"));
            }
            auth = auth.with_bcrypt_cost(cost);
        }

        // SMTP
        let smtp_port = get("SMTP_PORT")
            .unwrap_or_else(|| "587".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("SMTP_PORT"))?;

        let smtp_user = get("SMTP_USER").unwrap_or_default();

        let smtp = SmtpConfig {
            host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            port: smtp_port,
            from: get("SMTP_FROM").unwrap_or_else(|| smtp_user.clone()),
            username: smtp_user,
            password: get("SMTP_PASSWORD").unwrap_or_default(),
            frontend_url: get("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
        };

        let notification_queue_size = get("NOTIFICATION_QUEUE_SIZE")
            .unwrap_or_else(|| "256".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("NOTIFICATION_QUEUE_SIZE"))?;

        // Request timeout (default 30 seconds)
        let request_timeout_secs: u64 = get("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        let run_migrations = get("RUN_MIGRATIONS")
            .unwrap_or_else(|| "true".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("RUN_MIGRATIONS"))?;

        Ok(Self {
            http_port,
            database_url,
            environment,
            auth,
            smtp,
            notification_queue_size,
            request_timeout: Duration::from_secs(request_timeout_secs),
            run_migrations,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}
