use tracing::info;

use super::create_post::discard_uploads;
use crate::common::{AppError, PostId};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Delete a post and its media. Only the author may delete.
///
/// Each media deletion is attempted independently; a failure is logged and
/// does not stop the record from being removed.
pub async fn delete_post(deps: &ServerDeps, user: &User, post_id: PostId) -> Result<(), AppError> {
    let post = deps
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::not_found("Post not found"))?;

    if post.author_id != user.id {
        return Err(AppError::access_denied("Access denied"));
    }

    discard_uploads(deps, &post.media).await;
    deps.posts.delete(post.id).await?;

    info!(post_id = %post.id, user_id = %user.id, media = post.media.len(), "Post deleted");
    Ok(())
}
