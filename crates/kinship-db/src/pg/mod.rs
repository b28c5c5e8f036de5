//! PostgreSQL repository implementations

mod password_reset;
mod user;

pub use password_reset::PgPasswordResetRepository;
pub use user::PgUserRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: PgUserRepository,
    pub password_resets: PgPasswordResetRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            password_resets: PgPasswordResetRepository::new(pool),
        }
    }
}
