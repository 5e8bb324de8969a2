//! Users domain - accounts, profiles and dependents
//!
//! Responsibilities:
//! - User and Dependent records
//! - Postgres persistence behind `BaseUserStore`
//! - Profile edits and child/pet management

pub mod actions;
pub mod models;
pub mod store;

pub use models::{Dependent, Relationship, Role, User, UserSummary};
pub use store::PgUserStore;
