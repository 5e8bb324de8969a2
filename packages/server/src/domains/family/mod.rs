//! Family domain - family codes, membership and access resolution
//!
//! Responsibilities:
//! - Generating globally unique family codes
//! - Joining a family by code (mutual, non-transitive membership)
//! - Deciding whether a user may act on a family-tagged resource
//! - Repairing memberships left one-sided by an interrupted join

pub mod access;
pub mod actions;
pub mod code;

pub use access::{can_access_family_resource, grants_access, FamilyScope};
pub use actions::*;
pub use code::{allocate_family_code, generate_family_code};
