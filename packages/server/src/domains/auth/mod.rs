//! Auth domain - accounts, credentials and bearer tokens
//!
//! Responsibilities:
//! - Registration (with a fresh family code) and login
//! - Argon2id password hashing
//! - JWT issue and verification for the auth gate

pub mod actions;
pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtService};
