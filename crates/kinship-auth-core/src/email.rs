//! SMTP delivery for welcome and password reset mail

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::notify::{Notifier, NotifyError};

/// Display name on outgoing mail
const SENDER_NAME: &str = "Kinship";

/// SMTP connection and link settings
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Envelope sender; falls back to `username` when empty
    pub from: String,
    /// Base URL of the web frontend, used to build reset links
    pub frontend_url: String,
}

impl SmtpConfig {
    /// Credentials are present, so mail can actually be sent
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    fn sender(&self) -> &str {
        if self.from.is_empty() {
            &self.username
        } else {
            &self.from
        }
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from", &self.from)
            .field("frontend_url", &self.frontend_url)
            .finish_non_exhaustive()
    }
}

/// Link the user follows to choose a new password
pub fn reset_url(frontend_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password?token={}",
        frontend_url.trim_end_matches('/'),
        token
    )
}

pub fn welcome_body(username: &str) -> String {
    format!(
        "Hello {username},\n\
        \n\
        Welcome to Kinship! We're excited to have you join our community of people \
        connecting through shared interests.\n\
        \n\
        Explore our interest groups:\n\
        - Coworking: Connect with professionals and digital nomads\n\
        - Photography: Share and discuss your photography\n\
        - Food: Discover local cuisine and restaurants\n\
        - Languages: Practice and learn new languages\n\
        \n\
        Get started by completing your profile and joining your first interest group!\n\
        \n\
        Best regards,\n\
        The Kinship Team\n"
    )
}

pub fn password_reset_body(reset_url: &str) -> String {
    format!(
        "Hello,\n\
        \n\
        You have requested to reset your password. Follow the link below to choose a new one:\n\
        \n\
        {reset_url}\n\
        \n\
        This link will expire in 1 hour.\n\
        \n\
        If you did not request this password reset, please ignore this email.\n\
        \n\
        Best regards,\n\
        The Kinship Team\n"
    )
}

/// Sends plain-text mail over STARTTLS
pub struct SmtpNotifier {
    config: SmtpConfig,
    sender: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Result<Self, NotifyError> {
        let address: Address = config
            .sender()
            .parse()
            .map_err(|e| NotifyError::Address(format!("{}: {}", config.sender(), e)))?;
        let sender = Mailbox::new(Some(SENDER_NAME.to_string()), address);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .port(config.port)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        Ok(Self {
            config,
            sender,
            transport,
        })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), NotifyError> {
        let message = build_message(self.sender.clone(), to, subject, body)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        tracing::debug!(%to, %subject, "Email sent");
        Ok(())
    }
}

fn build_message(
    sender: Mailbox,
    to: &str,
    subject: &str,
    body: String,
) -> Result<Message, NotifyError> {
    let recipient: Mailbox = to
        .parse()
        .map_err(|e| NotifyError::Address(format!("{to}: {e}")))?;

    Message::builder()
        .from(sender)
        .to(recipient)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|e| NotifyError::Message(e.to_string()))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_welcome(&self, email: &str, username: &str) -> Result<(), NotifyError> {
        self.send(email, "Welcome to Kinship!", welcome_body(username))
            .await
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), NotifyError> {
        let link = reset_url(&self.config.frontend_url, token);
        self.send(email, "Password Reset Request", password_reset_body(&link))
            .await
    }
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
