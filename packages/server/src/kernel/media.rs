//! Media types shared by the media store adapter and the post lifecycle.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Remote resource type. Cloudinary keeps images and videos in separate
/// namespaces, so the kind is needed again at delete time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// `video/*` uploads are videos; everything else is stored as an image.
    pub fn from_mime(content_type: &str) -> Self {
        if content_type.to_ascii_lowercase().starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded file buffered in memory for the duration of one request.
///
/// The bytes are released when the value is dropped, so every exit path of
/// post creation frees them without explicit cleanup.
#[derive(Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.content_type)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Reference returned by a committed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub url: String,
    pub public_id: String,
}

#[derive(Error, Debug)]
pub enum MediaStoreError {
    #[error("media store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("media store unreachable: {0}")]
    Transport(String),

    #[error("media store call timed out")]
    Timeout,
}

impl From<MediaStoreError> for crate::common::AppError {
    fn from(err: MediaStoreError) -> Self {
        crate::common::AppError::Upstream(err.to_string())
    }
}
