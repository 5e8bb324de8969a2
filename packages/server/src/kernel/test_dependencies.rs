// TestDependencies - in-memory implementations for testing
//
// Provides store and media doubles that can be injected into ServerDeps, with
// failure injection for exercising compensation paths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::media::{MediaKind, MediaStoreError, StoredMedia, UploadFile};
use super::{BaseMediaStore, BasePostStore, BaseUserStore, ServerDeps};
use crate::common::{DependentId, PageRequest, PostId, StoreError, UserId};
use crate::domains::auth::JwtService;
use crate::domains::posts::models::{Comment, Like, Post};
use crate::domains::users::models::{Dependent, ProfileUpdate, Role, User};

fn injected(what: &str) -> StoreError {
    StoreError::Backend(anyhow::anyhow!("injected failure: {}", what))
}

// =============================================================================
// In-memory User Store
// =============================================================================

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
    failing_links_from: Mutex<HashSet<UserId>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `add_family_member(user_id, _)` fail, simulating a crash between
    /// the two membership writes.
    pub fn fail_links_from(&self, user_id: UserId) {
        self.failing_links_from.lock().unwrap().insert(user_id);
    }

    pub fn heal_links(&self) {
        self.failing_links_from.lock().unwrap().clear();
    }

    pub fn get(&self, id: UserId) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BaseUserStore for InMemoryUserStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".into()));
        }
        if user.family_code.is_some()
            && users.iter().any(|u| u.family_code == user.family_code)
        {
            return Err(StoreError::Conflict("users_family_code_key".into()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_family_code(&self, code: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.family_code.as_deref() == Some(code))
            .cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| users.iter().find(|u| u.id == *id).cloned())
            .collect())
    }

    async fn family_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().any(|u| u.family_code.as_deref() == Some(code)))
    }

    async fn add_family_member(
        &self,
        user_id: UserId,
        member_id: UserId,
    ) -> Result<(), StoreError> {
        if self.failing_links_from.lock().unwrap().contains(&user_id) {
            return Err(injected("add_family_member"));
        }
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| injected("unknown user"))?;
        if !user.family_members.contains(&member_id) {
            user.family_members.push(member_id);
        }
        Ok(())
    }

    async fn repair_family_links(&self, dry_run: bool) -> Result<u64, StoreError> {
        let mut users = self.users.lock().unwrap();
        let missing: Vec<(UserId, UserId)> = users
            .iter()
            .flat_map(|u| u.family_members.iter().map(move |m| (*m, u.id)))
            .filter(|(owner, member)| {
                users
                    .iter()
                    .find(|u| u.id == *owner)
                    .is_some_and(|u| !u.family_members.contains(member))
            })
            .collect();
        if !dry_run {
            for (owner, member) in &missing {
                if let Some(user) = users.iter_mut().find(|u| u.id == *owner) {
                    user.family_members.push(*member);
                }
            }
        }
        Ok(missing.len() as u64)
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(first_name) = &update.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(picture) = &update.profile_picture {
            user.profile_picture = picture.clone();
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.last_login = at;
        }
        Ok(())
    }

    async fn insert_dependent(
        &self,
        user_id: UserId,
        dependent: &Dependent,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| injected("unknown user"))?;
        user.dependents.push(dependent.clone());
        Ok(())
    }

    async fn update_dependent(
        &self,
        user_id: UserId,
        dependent: &Dependent,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.lock().unwrap();
        let slot = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .and_then(|u| u.dependents.iter_mut().find(|d| d.id == dependent.id));
        match slot {
            Some(existing) => {
                *existing = dependent.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_dependent(
        &self,
        user_id: UserId,
        dependent_id: DependentId,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(false);
        };
        let before = user.dependents.len();
        user.dependents.retain(|d| d.id != dependent_id);
        Ok(user.dependents.len() != before)
    }
}

// =============================================================================
// In-memory Post Store
// =============================================================================

#[derive(Default)]
pub struct InMemoryPostStore {
    posts: Mutex<Vec<Post>>,
    fail_inserts: Mutex<bool>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `insert` fail after the uploads have already happened.
    pub fn fail_inserts(&self) {
        *self.fail_inserts.lock().unwrap() = true;
    }

    pub fn get(&self, id: PostId) -> Option<Post> {
        self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BasePostStore for InMemoryPostStore {
    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        if *self.fail_inserts.lock().unwrap() {
            return Err(injected("post insert"));
        }
        self.posts.lock().unwrap().push(post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        Ok(self.get(id))
    }

    async fn list_by_family_codes(
        &self,
        codes: &[String],
        page: PageRequest,
    ) -> Result<(Vec<Post>, i64), StoreError> {
        let posts = self.posts.lock().unwrap();
        let mut matching: Vec<Post> = posts
            .iter()
            .filter(|p| codes.contains(&p.family_code))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn add_like(&self, post_id: PostId, like: &Like) -> Result<bool, StoreError> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(false);
        };
        if post.liked_by(like.user_id) {
            return Ok(false);
        }
        post.likes.push(like.clone());
        Ok(true)
    }

    async fn remove_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, StoreError> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(false);
        };
        let before = post.likes.len();
        post.likes.retain(|l| l.user_id != user_id);
        Ok(post.likes.len() != before)
    }

    async fn likes(&self, post_id: PostId) -> Result<Vec<Like>, StoreError> {
        Ok(self.get(post_id).map(|p| p.likes).unwrap_or_default())
    }

    async fn add_comment(&self, post_id: PostId, comment: &Comment) -> Result<(), StoreError> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| injected("unknown post"))?;
        post.comments.push(comment.clone());
        Ok(())
    }

    async fn delete(&self, id: PostId) -> Result<bool, StoreError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() != before)
    }
}

// =============================================================================
// Mock Media Store
// =============================================================================

/// Records every upload and delete; uploads get sequential public ids.
#[derive(Default)]
pub struct MockMediaStore {
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    upload_calls: Mutex<usize>,
    fail_upload_at: Mutex<Option<usize>>,
    fail_deletes: Mutex<bool>,
    delay_upload_at: Mutex<Option<(usize, Duration)>>,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`-th upload call (1-based, counted across the store's lifetime).
    pub fn fail_upload_at(self, n: usize) -> Self {
        *self.fail_upload_at.lock().unwrap() = Some(n);
        self
    }

    /// Hold the `n`-th upload call for `delay` before answering.
    pub fn delay_upload_at(self, n: usize, delay: Duration) -> Self {
        *self.delay_upload_at.lock().unwrap() = Some((n, delay));
        self
    }

    pub fn fail_deletes(self) -> Self {
        *self.fail_deletes.lock().unwrap() = true;
        self
    }

    /// Public ids of every successful upload, in order.
    pub fn uploaded(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    /// Public ids passed to `delete`, in order (including failed attempts).
    pub fn deleted(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    /// Assets uploaded and not (successfully) deleted.
    pub fn live(&self) -> Vec<String> {
        let deleted = if *self.fail_deletes.lock().unwrap() {
            Vec::new()
        } else {
            self.deleted()
        };
        self.uploaded()
            .into_iter()
            .filter(|id| !deleted.contains(id))
            .collect()
    }

    pub fn upload_calls(&self) -> usize {
        *self.upload_calls.lock().unwrap()
    }
}

#[async_trait]
impl BaseMediaStore for MockMediaStore {
    async fn upload(
        &self,
        file: &UploadFile,
        kind: MediaKind,
    ) -> Result<StoredMedia, MediaStoreError> {
        let call = {
            let mut calls = self.upload_calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        let delay = match *self.delay_upload_at.lock().unwrap() {
            Some((n, delay)) if n == call => Some(delay),
            _ => None,
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_upload_at.lock().unwrap() == Some(call) {
            return Err(MediaStoreError::Rejected {
                status: 500,
                message: format!("injected failure on upload {}", call),
            });
        }
        let public_id = format!("family-photos/{}-{}", call, file.file_name);
        self.uploads.lock().unwrap().push(public_id.clone());
        Ok(StoredMedia {
            url: format!("https://media.test/{}/{}", kind, public_id),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str, _kind: MediaKind) -> Result<(), MediaStoreError> {
        self.deletes.lock().unwrap().push(public_id.to_string());
        if *self.fail_deletes.lock().unwrap() {
            return Err(MediaStoreError::Transport("injected delete failure".into()));
        }
        Ok(())
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of doubles plus the `ServerDeps` wired to them.
pub struct TestDependencies {
    pub users: Arc<InMemoryUserStore>,
    pub posts: Arc<InMemoryPostStore>,
    pub media: Arc<MockMediaStore>,
    pub jwt_service: Arc<JwtService>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self::with_media(MockMediaStore::new())
    }

    pub fn with_media(media: MockMediaStore) -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            posts: Arc::new(InMemoryPostStore::new()),
            media: Arc::new(media),
            jwt_service: Arc::new(JwtService::new("test_secret", "test_issuer".to_string())),
        }
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.users.clone(),
            self.posts.clone(),
            self.media.clone(),
            self.jwt_service.clone(),
        )
    }

    /// Insert a user directly, bypassing registration (no password hashing).
    pub async fn seed_user(&self, first_name: &str, family_code: Option<&str>) -> User {
        let user = User::new(
            format!("{}@example.com", first_name.to_lowercase()),
            "$argon2id$seeded".to_string(),
            first_name.to_string(),
            "Tester".to_string(),
            Role::Parent,
            family_code.map(str::to_string),
        );
        self.users
            .insert(&user)
            .await
            .expect("seeded user should insert");
        user
    }

    /// Current stored state of a user.
    pub fn user(&self, id: UserId) -> User {
        self.users.get(id).expect("user should exist")
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
