//! Likes and comments, gated by family access.

use tracing::info;

use super::views::{CommentView, LikeView, UserDirectory};
use crate::common::{AppError, PostId};
use crate::domains::family::can_access_family_resource;
use crate::domains::posts::models::{Comment, Like, Post, MAX_COMMENT_CHARS};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Result of toggling a like.
#[derive(Debug, Clone)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes: Vec<LikeView>,
}

impl LikeOutcome {
    pub fn message(&self) -> &'static str {
        if self.liked {
            "Post liked"
        } else {
            "Post unliked"
        }
    }
}

/// Load the post and check the acting user may engage with it.
async fn accessible_post(deps: &ServerDeps, user: &User, post_id: PostId) -> Result<Post, AppError> {
    let post = deps
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("Post not found"))?;

    if !can_access_family_resource(deps.users.as_ref(), user, &post.family_code).await? {
        return Err(AppError::access_denied("Access denied"));
    }
    Ok(post)
}

/// Toggle the acting user's like: remove it if present, add it otherwise.
pub async fn like_post(deps: &ServerDeps, user: &User, post_id: PostId) -> Result<LikeOutcome, AppError> {
    let post = accessible_post(deps, user, post_id).await?;

    let liked = if post.liked_by(user.id) {
        deps.posts.remove_like(post.id, user.id).await?;
        false
    } else {
        // A concurrent like from the same user loses quietly to the unique index.
        deps.posts.add_like(post.id, &Like::new(user.id)).await?;
        true
    };

    let likes = deps.posts.likes(post.id).await?;
    let directory = UserDirectory::load(deps, likes.iter().map(|l| l.user_id).collect()).await?;
    info!(post_id = %post.id, user_id = %user.id, liked, count = likes.len(), "Like toggled");

    Ok(LikeOutcome {
        liked,
        likes: likes.iter().map(|l| directory.like(l)).collect(),
    })
}

/// Append a comment and return just the new entry.
pub async fn add_comment(
    deps: &ServerDeps,
    user: &User,
    post_id: PostId,
    text: &str,
) -> Result<CommentView, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::validation("Comment text is required"));
    }
    if text.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::validation(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_CHARS
        )));
    }

    let post = accessible_post(deps, user, post_id).await?;
    let comment = Comment::new(user.id, text.to_string());
    deps.posts.add_comment(post.id, &comment).await?;

    info!(post_id = %post.id, user_id = %user.id, comment_id = %comment.id, "Comment added");
    let directory = UserDirectory::load(deps, vec![user.id]).await?;
    Ok(directory.comment(&comment))
}
