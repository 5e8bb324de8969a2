//! Feed presentation: posts with author, like and comment users resolved.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{AppError, CommentId, LikeId, PostId, UserId};
use crate::domains::posts::models::{Comment, Like, Media, Post, Tag};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Public face of a user inside a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: String,
}

impl PostUser {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }

    /// Placeholder for a user that no longer resolves.
    fn unknown(id: UserId) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            profile_picture: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeView {
    pub id: LikeId,
    pub user: PostUser,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub user: PostUser,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: PostId,
    pub author: PostUser,
    pub caption: String,
    pub media: Vec<Media>,
    pub tags: Vec<Tag>,
    pub family_code: String,
    pub is_private: bool,
    pub likes: Vec<LikeView>,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
}

/// Users referenced by a batch of posts, loaded in one lookup.
pub(crate) struct UserDirectory {
    users: HashMap<UserId, PostUser>,
}

impl UserDirectory {
    pub(crate) async fn load(
        deps: &ServerDeps,
        mut ids: Vec<UserId>,
    ) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        ids.retain(|id| seen.insert(*id));
        let users = deps
            .users
            .find_many(&ids)
            .await?
            .iter()
            .map(|u| (u.id, PostUser::from_user(u)))
            .collect();
        Ok(Self { users })
    }

    pub(crate) async fn for_posts(deps: &ServerDeps, posts: &[Post]) -> Result<Self, AppError> {
        let ids: Vec<UserId> = posts
            .iter()
            .flat_map(|p| {
                std::iter::once(p.author_id)
                    .chain(p.likes.iter().map(|l| l.user_id))
                    .chain(p.comments.iter().map(|c| c.user_id))
            })
            .collect();
        Self::load(deps, ids).await
    }

    fn user(&self, id: UserId) -> PostUser {
        self.users
            .get(&id)
            .cloned()
            .unwrap_or_else(|| PostUser::unknown(id))
    }

    pub(crate) fn like(&self, like: &Like) -> LikeView {
        LikeView {
            id: like.id,
            user: self.user(like.user_id),
            created_at: like.created_at,
        }
    }

    pub(crate) fn comment(&self, comment: &Comment) -> CommentView {
        CommentView {
            id: comment.id,
            user: self.user(comment.user_id),
            text: comment.text.clone(),
            created_at: comment.created_at,
        }
    }

    pub(crate) fn post(&self, post: Post) -> PostView {
        PostView {
            id: post.id,
            author: self.user(post.author_id),
            likes: post.likes.iter().map(|l| self.like(l)).collect(),
            comments: post.comments.iter().map(|c| self.comment(c)).collect(),
            caption: post.caption,
            media: post.media,
            tags: post.tags,
            family_code: post.family_code,
            is_private: post.is_private,
            created_at: post.created_at,
        }
    }
}

/// View of a post its author just created, built without a store lookup.
///
/// A fresh post has no likes or comments, so the author is the only user
/// it references.
pub fn present_new_post(author: &User, post: Post) -> PostView {
    let directory = UserDirectory {
        users: HashMap::from([(author.id, PostUser::from_user(author))]),
    };
    directory.post(post)
}
