pub mod auth;
pub mod health;
pub mod posts;
pub mod profile;

pub use auth::*;
pub use health::*;
pub use posts::*;
pub use profile::*;
