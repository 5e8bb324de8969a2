// Business domains
pub mod auth;
pub mod family;
pub mod posts;
pub mod users;
