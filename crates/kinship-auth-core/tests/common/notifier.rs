//! Notifiers that record or fail, for observing fire-and-forget delivery

use async_trait::async_trait;
use kinship_auth_core::{Notification, Notifier, NotifyError};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// Forwards every delivered notification to a channel
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl RecordingNotifier {
    pub fn new() -> (Self, NotificationLog) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, NotificationLog { rx: Mutex::new(rx) })
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_welcome(&self, email: &str, username: &str) -> Result<(), NotifyError> {
        let _ = self.tx.send(Notification::Welcome {
            email: email.to_string(),
            username: username.to_string(),
        });
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), NotifyError> {
        let _ = self.tx.send(Notification::PasswordReset {
            email: email.to_string(),
            token: token.to_string(),
        });
        Ok(())
    }
}

/// Receiving side of a [`RecordingNotifier`]
pub struct NotificationLog {
    rx: Mutex<mpsc::UnboundedReceiver<Notification>>,
}

#[allow(dead_code)]
impl NotificationLog {
    /// Wait for the next delivered notification
    pub async fn next(&self) -> Notification {
        tokio::time::timeout(Duration::from_secs(5), self.rx.lock().await.recv())
            .await
            .expect("timed out waiting for notification")
            .expect("notifier dropped")
    }

    /// Wait for the next password reset and return its raw token
    pub async fn next_reset_token(&self) -> String {
        loop {
            if let Notification::PasswordReset { token, .. } = self.next().await {
                return token;
            }
        }
    }

    /// Whether nothing has arrived within a short grace period
    pub async fn is_quiet(&self) -> bool {
        tokio::time::timeout(Duration::from_millis(100), self.rx.lock().await.recv())
            .await
            .is_err()
    }
}

/// Fails every delivery
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_welcome(&self, _: &str, _: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".to_string()))
    }

    async fn send_password_reset(&self, _: &str, _: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".to_string()))
    }
}
