//! Kinship Types - Shared domain types
//!
//! This crate contains domain types used across Kinship services:
//! - User identity and the outward user profile
//! - Authentication request and response payloads

pub mod auth;
pub mod user;

pub use auth::*;
pub use user::*;
