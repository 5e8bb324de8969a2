// Family Moments - API Core
//
// Backend for private family photo and video sharing: accounts, family
// groups joined by code, child/pet profiles, and a family-scoped media feed.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
