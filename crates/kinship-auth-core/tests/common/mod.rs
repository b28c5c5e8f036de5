//! Common test utilities for kinship-auth-core integration tests

pub mod mock_repos;
pub mod notifier;

#[allow(unused_imports)]
pub use mock_repos::{MockPasswordResetRepository, MockUserRepository};
#[allow(unused_imports)]
pub use notifier::{FailingNotifier, NotificationLog, RecordingNotifier};

use kinship_auth_core::{AuthConfig, AuthService, NotificationDispatcher, Notifier};
use kinship_types::RegisterRequest;
use std::sync::Arc;

pub const TEST_SECRET: &str = "integration-test-signing-secret-0123456789";

pub type TestService = AuthService<MockUserRepository, MockPasswordResetRepository>;

/// Config with the cheapest bcrypt cost so tests stay fast
pub fn test_config() -> AuthConfig {
    AuthConfig::try_new(TEST_SECRET)
        .expect("test secret is long enough")
        .with_bcrypt_cost(4)
}

/// Service wired to in-memory repositories and the given notifier
#[allow(dead_code)]
pub struct Harness {
    pub service: TestService,
    pub users: MockUserRepository,
    pub resets: MockPasswordResetRepository,
}

#[allow(dead_code)]
impl Harness {
    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        let users = MockUserRepository::new();
        let resets = MockPasswordResetRepository::new();
        // The worker exits when the service (and its dispatcher) is dropped
        let (dispatcher, _worker) = NotificationDispatcher::new(notifier, 64);
        let service = AuthService::new(
            test_config(),
            Arc::new(users.clone()),
            Arc::new(resets.clone()),
            dispatcher,
        );
        Self {
            service,
            users,
            resets,
        }
    }

    /// Harness plus a log of delivered notifications
    pub fn recording() -> (Self, NotificationLog) {
        let (notifier, log) = RecordingNotifier::new();
        (Self::with_notifier(Arc::new(notifier)), log)
    }
}

#[allow(dead_code)]
pub fn register_request(email: &str, username: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        username: username.to_string(),
        password: password.to_string(),
        first_name: None,
        last_name: None,
        interests: Vec::new(),
    }
}
