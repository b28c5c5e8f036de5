//! Fire-and-forget user notifications.
//!
//! Request handlers hand notifications to a [`NotificationDispatcher`], which
//! queues them on a bounded channel for a single background worker. Delivery
//! failures and a full queue are logged and never reach the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::email::SmtpConfig;

/// Errors raised while delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Sender or recipient address could not be parsed
    #[error("invalid address: {0}")]
    Address(String),

    /// Message could not be assembled
    #[error("failed to build message: {0}")]
    Message(String),

    /// Mail transport failed
    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Greet a newly registered user.
    async fn send_welcome(&self, email: &str, username: &str) -> Result<(), NotifyError>;

    /// Deliver a raw password reset token.
    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), NotifyError>;
}

/// A queued notification.
#[derive(Clone, PartialEq, Eq)]
pub enum Notification {
    Welcome { email: String, username: String },
    PasswordReset { email: String, token: String },
}

impl Notification {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::PasswordReset { .. } => "password_reset",
        }
    }

    /// Destination address.
    pub fn recipient(&self) -> &str {
        match self {
            Self::Welcome { email, .. } | Self::PasswordReset { email, .. } => email,
        }
    }

    async fn deliver(&self, notifier: &dyn Notifier) -> Result<(), NotifyError> {
        match self {
            Self::Welcome { email, username } => notifier.send_welcome(email, username).await,
            Self::PasswordReset { email, token } => {
                notifier.send_password_reset(email, token).await
            }
        }
    }
}

impl std::fmt::Debug for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Welcome { email, username } => f
                .debug_struct("Welcome")
                .field("email", email)
                .field("username", username)
                .finish(),
            Self::PasswordReset { email, .. } => f
                .debug_struct("PasswordReset")
                .field("email", email)
                .field("token", &"[redacted]")
                .finish(),
        }
    }
}

/// Queues notifications for background delivery.
#[derive(Clone, Debug)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<Notification>,
}

impl NotificationDispatcher {
    /// Start the background worker.
    ///
    /// Returns the dispatcher and a handle to the worker task. The worker
    /// exits once every dispatcher clone has been dropped and the queue is
    /// drained.
    pub fn new(
        notifier: Arc<dyn Notifier>,
        buffer_size: usize,
    ) -> (Self, NotificationWorkerHandle) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));

        let handle = NotificationWorkerHandle {
            task: tokio::spawn(Self::run_background(notifier, rx)),
        };

        (Self { tx }, handle)
    }

    /// Queue a notification without waiting.
    pub fn dispatch(&self, notification: Notification) {
        let kind = notification.kind();
        if let Err(e) = self.tx.try_send(notification) {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "queue full",
                mpsc::error::TrySendError::Closed(_) => "worker stopped",
            };
            tracing::warn!(kind, reason, "Dropping notification");
        }
    }

    /// Queue a welcome message.
    pub fn welcome(&self, email: impl Into<String>, username: impl Into<String>) {
        self.dispatch(Notification::Welcome {
            email: email.into(),
            username: username.into(),
        });
    }

    /// Queue a password reset message.
    pub fn password_reset(&self, email: impl Into<String>, token: impl Into<String>) {
        self.dispatch(Notification::PasswordReset {
            email: email.into(),
            token: token.into(),
        });
    }

    async fn run_background(notifier: Arc<dyn Notifier>, mut rx: mpsc::Receiver<Notification>) {
        while let Some(notification) = rx.recv().await {
            match notification.deliver(notifier.as_ref()).await {
                Ok(()) => tracing::debug!(kind = notification.kind(), "Notification sent"),
                Err(e) => tracing::warn!(
                    error = %e,
                    kind = notification.kind(),
                    "Failed to send notification"
                ),
            }
        }
        tracing::debug!("Notification worker stopped");
    }
}

/// Handle for the background notification worker.
pub struct NotificationWorkerHandle {
    task: tokio::task::JoinHandle<()>,
}

impl NotificationWorkerHandle {
    /// Wait for the worker to drain the queue and exit.
    pub async fn shutdown(self) {
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Notification worker ended abnormally");
        }
    }
}

/// Writes notifications to the log instead of sending them.
///
/// Used when no SMTP credentials are configured.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    frontend_url: String,
}

impl LogNotifier {
    pub fn new(frontend_url: impl Into<String>) -> Self {
        Self {
            frontend_url: frontend_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_welcome(&self, email: &str, username: &str) -> Result<(), NotifyError> {
        tracing::info!(%email, %username, "[dev] welcome email not sent, SMTP not configured");
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), NotifyError> {
        // Development mode only: the link is the one thing a developer needs
        let reset_url = crate::email::reset_url(&self.frontend_url, token);
        tracing::info!(%email, %reset_url, "[dev] password reset email not sent, SMTP not configured");
        Ok(())
    }
}

/// Pick the SMTP notifier when credentials are present, otherwise log only.
pub fn build_notifier(config: &SmtpConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    if config.is_configured() {
        tracing::info!(host = %config.host, port = config.port, "Using SMTP notifier");
        Ok(Arc::new(crate::email::SmtpNotifier::new(config.clone())?))
    } else {
        tracing::warn!("SMTP credentials not set, notifications will only be logged");
        Ok(Arc::new(LogNotifier::new(config.frontend_url.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for Collect {
        async fn send_welcome(&self, email: &str, username: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(Notification::Welcome {
                email: email.to_string(),
                username: username.to_string(),
            });
            Ok(())
        }

        async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(Notification::PasswordReset {
                email: email.to_string(),
                token: token.to_string(),
            });
            Ok(())
        }
    }

    struct AlwaysFails(AtomicUsize);

    #[async_trait]
    impl Notifier for AlwaysFails {
        async fn send_welcome(&self, _: &str, _: &str) -> Result<(), NotifyError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(NotifyError::Transport("down".to_string()))
        }

        async fn send_password_reset(&self, _: &str, _: &str) -> Result<(), NotifyError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(NotifyError::Transport("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_dispatch_delivers_in_order() {
        let notifier = Arc::new(Collect::default());
        let (dispatcher, handle) = NotificationDispatcher::new(notifier.clone(), 8);

        dispatcher.welcome("a@x.com", "alice");
        dispatcher.password_reset("a@x.com", "abc123");
        drop(dispatcher);
        handle.shutdown().await;

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].kind(), "welcome");
        assert_eq!(sent[1].kind(), "password_reset");
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_worker() {
        let notifier = Arc::new(AlwaysFails(AtomicUsize::new(0)));
        let (dispatcher, handle) = NotificationDispatcher::new(notifier.clone(), 8);

        dispatcher.welcome("a@x.com", "alice");
        dispatcher.welcome("b@x.com", "bob");
        drop(dispatcher);
        handle.shutdown().await;

        assert_eq!(notifier.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_full_queue_drops_without_blocking() {
        let notifier = Arc::new(Collect::default());
        let (dispatcher, handle) = NotificationDispatcher::new(notifier.clone(), 1);

        // The worker cannot run until this task yields, so only one fits.
        for i in 0..5 {
            dispatcher.welcome(format!("user{i}@x.com"), format!("user{i}"));
        }
        drop(dispatcher);
        handle.shutdown().await;

        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_debug_redacts_reset_token() {
        let n = Notification::PasswordReset {
            email: "a@x.com".to_string(),
            token: "super-secret-token".to_string(),
        };
        let dbg = format!("{n:?}");
        assert!(!dbg.contains("super-secret-token"));
        assert!(dbg.contains("a@x.com"));
        assert_eq!(n.recipient(), "a@x.com");
    }

    #[tokio::test]
    async fn test_build_notifier_falls_back_to_log() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from: String::new(),
            frontend_url: "http://localhost:3000".to_string(),
        };
        let notifier = build_notifier(&config).unwrap();
        assert!(notifier.send_password_reset("a@x.com", "tok").await.is_ok());
    }
}
