//! Family domain actions - business logic functions
//!
//! Actions are async functions called directly from the REST handlers with
//! the shared `ServerDeps`.

mod join_family;
mod overview;
mod reconcile;

pub use join_family::join_family;
pub use overview::{family_overview, FamilyChild, FamilyMemberView, FamilyOverview};
pub use reconcile::reconcile_family_links;
