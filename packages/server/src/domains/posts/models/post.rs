use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{CommentId, DependentId, LikeId, PostId, UserId};
use crate::kernel::media::{MediaKind, StoredMedia};

/// Longest accepted comment, in characters, after trimming.
pub const MAX_COMMENT_CHARS: usize = 500;

/// Family feed entry.
///
/// `family_code` is a snapshot of the author's code at creation time; later
/// membership changes never rewrite it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub caption: String,
    pub media: Vec<Media>,
    pub tags: Vec<Tag>,
    pub family_code: String,
    pub is_private: bool,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        author_id: UserId,
        caption: String,
        media: Vec<Media>,
        tags: Vec<Tag>,
        family_code: String,
        is_private: bool,
    ) -> Self {
        Self {
            id: PostId::new(),
            author_id,
            caption,
            media,
            tags,
            family_code,
            is_private,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn liked_by(&self, user_id: UserId) -> bool {
        self.likes.iter().any(|like| like.user_id == user_id)
    }
}

/// A committed remote asset attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    pub public_id: String,
}

impl Media {
    pub fn from_stored(kind: MediaKind, stored: StoredMedia) -> Self {
        Self {
            kind,
            url: stored.url,
            public_id: stored.public_id,
        }
    }
}

/// Dependent tagged on a post. The name is denormalized so the tag survives
/// renames and removal of the dependent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(alias = "childId", alias = "_id")]
    pub id: DependentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: LikeId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: LikeId::new(),
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub user_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user_id: UserId, text: String) -> Self {
        Self {
            id: CommentId::new(),
            user_id,
            text,
            created_at: Utc::now(),
        }
    }
}
