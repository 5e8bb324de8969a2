//! `/posts` handlers.
//!
//! Uploads arrive as multipart: repeated `media` file parts plus `caption`,
//! `tags` (a JSON array) and `isPrivate` text parts.

use axum::{
    extract::{rejection::JsonRejection, Extension, Multipart, Path, Query},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::common::{AppError, PageQuery, PostId};
use crate::domains::posts::actions::{
    self, check_upload, NewPost, MAX_FILES_PER_POST,
};
use crate::domains::posts::models::Tag;
use crate::kernel::UploadFile;
use crate::server::app::AppState;
use crate::server::middleware::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

fn post_id(raw: &str) -> Result<PostId, AppError> {
    raw.parse().map_err(|_| AppError::not_found("Post not found"))
}

pub async fn list_posts_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let page = actions::list_family_posts(&state.deps, &user, query.validate()).await?;
    Ok(Json(json!({
        "posts": page.items,
        "totalPages": page.total_pages,
        "currentPage": page.current_page,
        "total": page.total,
    })))
}

/// Read the multipart body into a `NewPost`, rejecting bad files as they arrive.
async fn read_new_post(mut multipart: Multipart) -> Result<NewPost, AppError> {
    let mut input = NewPost::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "media" => {
                if input.files.len() >= MAX_FILES_PER_POST {
                    return Err(AppError::validation(format!(
                        "At most {} files per post",
                        MAX_FILES_PER_POST
                    )));
                }
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&file_name)
                            .first_or_octet_stream()
                            .to_string()
                    });
                let bytes = field.bytes().await?;
                let file = UploadFile::new(file_name, content_type, bytes);
                check_upload(&file)?;
                debug!(file_name = %file.file_name, bytes = file.len(), "Received upload part");
                input.files.push(file);
            }
            "caption" => {
                input.caption = Some(field.text().await?);
            }
            "tags" => {
                let raw = field.text().await?;
                if !raw.trim().is_empty() {
                    input.tags = serde_json::from_str::<Vec<Tag>>(&raw)
                        .map_err(|_| AppError::validation("Tags must be a JSON array"))?;
                }
            }
            "isPrivate" => {
                input.is_private = field.text().await? == "true";
            }
            _ => {}
        }
    }

    Ok(input)
}

pub async fn create_post_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let input = read_new_post(multipart).await?;
    let post = actions::create_post(&state.deps, &user, input).await?;
    let view = actions::present_new_post(&user, post);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Post created successfully",
            "post": view,
        })),
    ))
}

pub async fn like_post_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let outcome = actions::like_post(&state.deps, &user, post_id(&id)?).await?;
    Ok(Json(json!({
        "message": outcome.message(),
        "likes": outcome.likes,
    })))
}

pub async fn add_comment_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = post_id(&id)?;
    let Json(request) = body?;
    let comment = actions::add_comment(&state.deps, &user, id, &request.text).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Comment added successfully",
            "comment": comment,
        })),
    ))
}

pub async fn delete_post_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    actions::delete_post(&state.deps, &user, post_id(&id)?).await?;
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}
