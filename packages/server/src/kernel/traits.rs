// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Family policy and the post saga live in the domains and call these traits.
//
// Naming convention: Base* for trait names (e.g., BaseMediaStore, BaseUserStore)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{DependentId, PageRequest, PostId, StoreError, UserId};
use crate::domains::posts::models::{Comment, Like, Post};
use crate::domains::users::models::{Dependent, ProfileUpdate, User};
use crate::kernel::media::{MediaKind, MediaStoreError, StoredMedia, UploadFile};

// =============================================================================
// Media Store Trait (Infrastructure - remote asset storage)
// =============================================================================

#[async_trait]
pub trait BaseMediaStore: Send + Sync {
    /// Upload one asset. Either returns a usable reference or fails leaving
    /// nothing billable behind.
    async fn upload(
        &self,
        file: &UploadFile,
        kind: MediaKind,
    ) -> Result<StoredMedia, MediaStoreError>;

    /// Delete an asset by public id. Safe to call on cleanup paths; deleting
    /// an already-missing asset is not an error.
    async fn delete(&self, public_id: &str, kind: MediaKind) -> Result<(), MediaStoreError>;
}

// =============================================================================
// User Store Trait (Infrastructure - credential store)
// =============================================================================

#[async_trait]
pub trait BaseUserStore: Send + Sync {
    /// Insert a new user with its dependents. Duplicate email or family code
    /// yields `StoreError::Conflict`.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_family_code(&self, code: &str) -> Result<Option<User>, StoreError>;

    /// Load several users; missing ids are skipped, order follows `ids`.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;

    async fn family_code_exists(&self, code: &str) -> Result<bool, StoreError>;

    /// Append `member_id` to `user_id`'s membership list. One directed edge;
    /// adding an existing edge is a no-op.
    async fn add_family_member(&self, user_id: UserId, member_id: UserId)
        -> Result<(), StoreError>;

    /// Insert the missing reverse edge for every one-sided membership and
    /// return how many were (or, with `dry_run`, would be) repaired.
    async fn repair_family_links(&self, dry_run: bool) -> Result<u64, StoreError>;

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, StoreError>;

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn insert_dependent(
        &self,
        user_id: UserId,
        dependent: &Dependent,
    ) -> Result<(), StoreError>;

    /// Replace a dependent's fields. Returns false when the user owns no
    /// dependent with that id.
    async fn update_dependent(
        &self,
        user_id: UserId,
        dependent: &Dependent,
    ) -> Result<bool, StoreError>;

    async fn remove_dependent(
        &self,
        user_id: UserId,
        dependent_id: DependentId,
    ) -> Result<bool, StoreError>;
}

// =============================================================================
// Post Store Trait (Infrastructure - post repository)
// =============================================================================

#[async_trait]
pub trait BasePostStore: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<(), StoreError>;

    /// Load a post with its likes and comments.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError>;

    /// Posts tagged with any of `codes`, newest first, plus the total count.
    async fn list_by_family_codes(
        &self,
        codes: &[String],
        page: PageRequest,
    ) -> Result<(Vec<Post>, i64), StoreError>;

    /// Returns false if the user already liked the post.
    async fn add_like(&self, post_id: PostId, like: &Like) -> Result<bool, StoreError>;

    /// Returns false if there was no like to remove.
    async fn remove_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, StoreError>;

    async fn likes(&self, post_id: PostId) -> Result<Vec<Like>, StoreError>;

    async fn add_comment(&self, post_id: PostId, comment: &Comment) -> Result<(), StoreError>;

    /// Returns false if the post did not exist.
    async fn delete(&self, id: PostId) -> Result<bool, StoreError>;
}
