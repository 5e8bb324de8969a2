pub mod dependent;
pub mod user;

pub use dependent::{parse_birth_date, Dependent, Relationship};
pub use user::{normalize_email, ProfileUpdate, Role, User, UserSummary};
