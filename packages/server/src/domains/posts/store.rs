//! Postgres-backed post store.
//!
//! Media and tags are stored as JSONB on the post row; likes and comments
//! are child tables loaded alongside.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use super::models::{Comment, Like, Media, Post, Tag};
use crate::common::{CommentId, LikeId, PageRequest, PostId, StoreError, UserId};
use crate::kernel::BasePostStore;

#[derive(sqlx::FromRow, Debug)]
struct PostRow {
    id: PostId,
    author_id: UserId,
    caption: String,
    media: Json<Vec<Media>>,
    tags: Json<Vec<Tag>>,
    family_code: String,
    is_private: bool,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug)]
struct LikeRow {
    id: LikeId,
    post_id: PostId,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug)]
struct CommentRow {
    id: CommentId,
    post_id: PostId,
    user_id: UserId,
    text: String,
    created_at: DateTime<Utc>,
}

const POST_COLUMNS: &str =
    "id, author_id, caption, media, tags, family_code, is_private, created_at";

pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, rows: Vec<PostRow>) -> Result<Vec<Post>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<PostId> = rows.iter().map(|r| r.id).collect();

        let likes = sqlx::query_as::<_, LikeRow>(
            "SELECT id, post_id, user_id, created_at
             FROM post_likes
             WHERE post_id = ANY($1)
             ORDER BY created_at, id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let comments = sqlx::query_as::<_, CommentRow>(
            "SELECT id, post_id, user_id, text, created_at
             FROM post_comments
             WHERE post_id = ANY($1)
             ORDER BY created_at, id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut likes_by_post: HashMap<PostId, Vec<Like>> = HashMap::new();
        for row in likes {
            likes_by_post.entry(row.post_id).or_default().push(Like {
                id: row.id,
                user_id: row.user_id,
                created_at: row.created_at,
            });
        }

        let mut comments_by_post: HashMap<PostId, Vec<Comment>> = HashMap::new();
        for row in comments {
            comments_by_post.entry(row.post_id).or_default().push(Comment {
                id: row.id,
                user_id: row.user_id,
                text: row.text,
                created_at: row.created_at,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| Post {
                likes: likes_by_post.remove(&row.id).unwrap_or_default(),
                comments: comments_by_post.remove(&row.id).unwrap_or_default(),
                id: row.id,
                author_id: row.author_id,
                caption: row.caption,
                media: row.media.0,
                tags: row.tags.0,
                family_code: row.family_code,
                is_private: row.is_private,
                created_at: row.created_at,
            })
            .collect())
    }
}

#[async_trait]
impl BasePostStore for PgPostStore {
    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO posts (id, author_id, caption, media, tags, family_code, is_private, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(&post.caption)
        .bind(Json(&post.media))
        .bind(Json(&post.tags))
        .bind(&post.family_code)
        .bind(post.is_private)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_by_family_codes(
        &self,
        codes: &[String],
        page: PageRequest,
    ) -> Result<(Vec<Post>, i64), StoreError> {
        if codes.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {}
             FROM posts
             WHERE family_code = ANY($1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
            POST_COLUMNS
        ))
        .bind(codes)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE family_code = ANY($1)")
            .bind(codes)
            .fetch_one(&self.pool)
            .await?;

        Ok((self.hydrate(rows).await?, total))
    }

    async fn add_like(&self, post_id: PostId, like: &Like) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO post_likes (id, post_id, user_id, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (post_id, user_id) DO NOTHING",
        )
        .bind(like.id)
        .bind(post_id)
        .bind(like.user_id)
        .bind(like.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn likes(&self, post_id: PostId) -> Result<Vec<Like>, StoreError> {
        let rows = sqlx::query_as::<_, LikeRow>(
            "SELECT id, post_id, user_id, created_at
             FROM post_likes
             WHERE post_id = $1
             ORDER BY created_at, id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Like {
                id: row.id,
                user_id: row.user_id,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn add_comment(&self, post_id: PostId, comment: &Comment) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO post_comments (id, post_id, user_id, text, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(comment.id)
        .bind(post_id)
        .bind(comment.user_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: PostId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
