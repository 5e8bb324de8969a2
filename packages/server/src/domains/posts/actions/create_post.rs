//! Create post action - uploads media then persists the post, as a saga
//!
//! Steps and their compensation:
//! 1. Upload each file in order. If upload k fails, delete uploads 1..k-1.
//! 2. Insert the post. If the insert fails, delete every upload.
//!
//! Compensating deletes are best-effort: failures are logged and the
//! original error is returned.
//!
//! The steps run on a spawned task that owns its inputs. A request that
//! times out or disconnects stops waiting, but the saga still finishes and
//! either commits the post or deletes every upload.

use tracing::{error, info, warn};

use crate::common::{AppError, UserId};
use crate::domains::posts::models::{Media, Post, Tag};
use crate::domains::users::models::User;
use crate::kernel::media::UploadFile;
use crate::kernel::ServerDeps;

pub const MAX_FILES_PER_POST: usize = 10;
pub const MAX_FILE_BYTES: usize = 100 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &[
    "jpeg", "jpg", "png", "gif", "webp", "mp4", "mov", "avi", "mkv",
];

/// A post as submitted, with its files already buffered.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub files: Vec<UploadFile>,
    pub caption: Option<String>,
    pub tags: Vec<Tag>,
    pub is_private: bool,
}

/// Accept only image or video MIME types with a known media extension.
pub fn check_upload(file: &UploadFile) -> Result<(), AppError> {
    let mime = file.content_type.to_ascii_lowercase();
    let media_mime = mime.starts_with("image/") || mime.starts_with("video/");
    let extension = std::path::Path::new(&file.file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let media_extension = extension
        .as_deref()
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext));

    if !media_mime || !media_extension {
        return Err(AppError::validation("Only image and video files are allowed"));
    }
    if file.len() > MAX_FILE_BYTES {
        return Err(AppError::validation("File exceeds the 100MB limit"));
    }
    Ok(())
}

pub async fn create_post(deps: &ServerDeps, author: &User, input: NewPost) -> Result<Post, AppError> {
    let family_code = match author.family_code.as_deref() {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => return Err(AppError::NoFamily),
    };
    if input.files.is_empty() {
        return Err(AppError::NoMedia);
    }
    if input.files.len() > MAX_FILES_PER_POST {
        return Err(AppError::validation(format!(
            "At most {} files per post",
            MAX_FILES_PER_POST
        )));
    }
    for file in &input.files {
        check_upload(file)?;
    }

    let saga = tokio::spawn(run_saga(deps.clone(), author.id, family_code, input));
    saga.await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Post creation task failed: {}", e)))?
}

async fn run_saga(
    deps: ServerDeps,
    author_id: UserId,
    family_code: String,
    input: NewPost,
) -> Result<Post, AppError> {
    let mut uploaded: Vec<Media> = Vec::with_capacity(input.files.len());
    for (index, file) in input.files.iter().enumerate() {
        let kind = file.kind();
        match deps.media.upload(file, kind).await {
            Ok(stored) => uploaded.push(Media::from_stored(kind, stored)),
            Err(e) => {
                error!(
                    author_id = %author_id,
                    file_index = index + 1,
                    committed = uploaded.len(),
                    error = %e,
                    "Media upload failed, rolling back committed uploads"
                );
                discard_uploads(&deps, &uploaded).await;
                return Err(e.into());
            }
        }
    }

    let post = Post::new(
        author_id,
        input.caption.unwrap_or_default(),
        uploaded,
        input.tags,
        family_code,
        input.is_private,
    );

    if let Err(e) = deps.posts.insert(&post).await {
        error!(
            author_id = %author_id,
            post_id = %post.id,
            error = %e,
            "Post insert failed after uploads, deleting uploaded media"
        );
        discard_uploads(&deps, &post.media).await;
        return Err(e.into());
    }

    info!(
        post_id = %post.id,
        author_id = %author_id,
        family_code = %post.family_code,
        media = post.media.len(),
        "Post created"
    );
    Ok(post)
}

/// Best-effort deletion of media that will not be referenced by any post.
pub(crate) async fn discard_uploads(deps: &ServerDeps, media: &[Media]) {
    for item in media {
        if let Err(e) = deps.media.delete(&item.public_id, item.kind).await {
            warn!(public_id = %item.public_id, error = %e, "Failed to delete media");
        }
    }
}
