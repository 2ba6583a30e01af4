//! Post repository (reads).

use sqlx::SqlitePool;

use super::types::Post;
use crate::db::Author;
use crate::{NaranjoError, Result};

/// Repository for post lookups.
pub struct PostRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepository<'a> {
    /// Create a new PostRepository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a post by ID, joined with its author.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            "SELECT p.id, p.thread_id, p.content, p.created_at,
                    u.id AS author_id, u.username AS author_username, u.avatar_url AS author_avatar_url
             FROM posts p
             JOIN users u ON u.id = p.author_id
             WHERE p.id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| NaranjoError::Database(e.to_string()))?;

        Ok(row.map(PostRow::into_post))
    }

    /// List a thread's posts, oldest first.
    pub async fn list_by_thread(&self, thread_id: i64, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            "SELECT p.id, p.thread_id, p.content, p.created_at,
                    u.id AS author_id, u.username AS author_username, u.avatar_url AS author_avatar_url
             FROM posts p
             JOIN users u ON u.id = p.author_id
             WHERE p.thread_id = ?
             ORDER BY p.created_at ASC, p.id ASC
             LIMIT ?",
        )
        .bind(thread_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| NaranjoError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    thread_id: i64,
    content: String,
    created_at: String,
    author_id: i64,
    author_username: String,
    author_avatar_url: String,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            id: self.id,
            thread_id: self.thread_id,
            content: self.content,
            created_at: self.created_at,
            author: Author {
                id: self.author_id,
                username: self.author_username,
                avatar_url: self.author_avatar_url,
            },
        }
    }
}
