//! HTTP handlers

mod auth;
mod health;

pub use auth::{confirm_password_reset, login, profile, register, request_password_reset};
pub use health::{health, ready};
