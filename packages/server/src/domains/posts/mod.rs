//! Posts domain - the family feed
//!
//! Responsibilities:
//! - Post, Media, Like and Comment records
//! - Postgres persistence behind `BasePostStore`
//! - Create (with compensating media deletes), like, comment, delete, list

pub mod actions;
pub mod models;
pub mod store;

pub use models::{Comment, Like, Media, Post, Tag};
pub use store::PgPostStore;
