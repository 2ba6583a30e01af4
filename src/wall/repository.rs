//! Message repository.

use sqlx::SqlitePool;

use super::message::Message;
use crate::datetime;
use crate::db::{map_write_error, Author};
use crate::{NaranjoError, Result};

/// Repository for wall messages.
pub struct MessageRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MessageRepository<'a> {
    /// Create a new MessageRepository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a message and return it with its author.
    pub async fn create(&self, author_id: i64, content: &str) -> Result<Message> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO messages (author_id, content, created_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(author_id)
        .bind(content)
        .bind(datetime::now_iso())
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| NaranjoError::NotFound("message".to_string()))
    }

    /// Get a message by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT m.id, m.content, m.created_at,
                    u.id AS author_id, u.username AS author_username, u.avatar_url AS author_avatar_url
             FROM messages m
             JOIN users u ON u.id = m.author_id
             WHERE m.id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| NaranjoError::Database(e.to_string()))?;

        Ok(row.map(MessageRow::into_message))
    }

    /// List the newest messages first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT m.id, m.content, m.created_at,
                    u.id AS author_id, u.username AS author_username, u.avatar_url AS author_avatar_url
             FROM messages m
             JOIN users u ON u.id = m.author_id
             ORDER BY m.created_at DESC, m.id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| NaranjoError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(MessageRow::into_message).collect())
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    content: String,
    created_at: String,
    author_id: i64,
    author_username: String,
    author_avatar_url: String,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
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
