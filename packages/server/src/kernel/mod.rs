//! Kernel module - server infrastructure and dependencies.

pub mod cloudinary;
pub mod db;
pub mod deps;
pub mod media;
pub mod test_dependencies;
pub mod traits;

pub use cloudinary::{CloudinaryConfig, CloudinaryMediaStore};
pub use deps::ServerDeps;
pub use media::{MediaKind, MediaStoreError, StoredMedia, UploadFile};
pub use test_dependencies::TestDependencies;
pub use traits::*;
