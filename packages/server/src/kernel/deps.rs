//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container handed to every
//! domain action. All external systems sit behind `Base*` traits so tests can
//! swap in the in-memory doubles from `test_dependencies`.

use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::{BaseMediaStore, BasePostStore, BaseUserStore};

/// Server dependencies accessible to domain actions
#[derive(Clone)]
pub struct ServerDeps {
    pub users: Arc<dyn BaseUserStore>,
    pub posts: Arc<dyn BasePostStore>,
    pub media: Arc<dyn BaseMediaStore>,
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    pub fn new(
        users: Arc<dyn BaseUserStore>,
        posts: Arc<dyn BasePostStore>,
        media: Arc<dyn BaseMediaStore>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            users,
            posts,
            media,
            jwt_service,
        }
    }
}

impl std::fmt::Debug for ServerDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerDeps")
            .field("jwt_service", &self.jwt_service)
            .finish_non_exhaustive()
    }
}
