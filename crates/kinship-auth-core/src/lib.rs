//! Kinship Auth Core - Authentication business logic
//!
//! Credential hashing, bearer token issuance and validation, single-use
//! password reset tokens, and the orchestration of register, login and
//! password reset flows.

pub mod config;
pub mod crypto;
pub mod email;
pub mod error;
pub mod notify;
pub mod password;
pub mod reset;
pub mod service;
pub mod token;

pub use config::*;
pub use crypto::{generate_reset_token, hash_token, SigningSecret, SigningSecretError};
pub use email::{SmtpConfig, SmtpNotifier};
pub use error::*;
pub use notify::{
    build_notifier, LogNotifier, Notification, NotificationDispatcher, NotificationWorkerHandle,
    Notifier, NotifyError,
};
pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
pub use reset::ResetTokenStore;
pub use service::*;
pub use token::{Claims, TokenIssuer};
