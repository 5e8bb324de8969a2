use tracing::debug;

use super::views::{PostView, UserDirectory};
use crate::common::{AppError, Page, PageRequest};
use crate::domains::family::FamilyScope;
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Family feed, newest first.
///
/// Covers every family code the user can reach: their own and each direct
/// member's. A user with neither has no feed.
pub async fn list_family_posts(
    deps: &ServerDeps,
    user: &User,
    page: PageRequest,
) -> Result<Page<PostView>, AppError> {
    // Includes direct members' codes: see "Feed and access scope" in DESIGN.md.
    let scope = FamilyScope::resolve(deps.users.as_ref(), user).await?;
    let codes = scope.codes();
    if codes.is_empty() {
        return Err(AppError::NoFamily);
    }
    debug!(user_id = %user.id, ?codes, page = page.page, limit = page.limit, "Listing family posts");

    let (posts, total) = deps.posts.list_by_family_codes(&codes, page).await?;
    let directory = UserDirectory::for_posts(deps, &posts).await?;
    Ok(Page::new(posts, total, page).map(|post| directory.post(post)))
}
