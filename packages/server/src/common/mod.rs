// Common types shared across domains and layers

pub mod entity_ids;
pub mod error;
pub mod id;
pub mod pagination;

pub use entity_ids::*;
pub use error::{AppError, StoreError};
pub use id::Id;
pub use pagination::{Page, PageQuery, PageRequest};
