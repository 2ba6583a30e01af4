//! Thread repository (reads).
//!
//! Writes happen inside transactions owned by [`super::ForumService`].

use sqlx::SqlitePool;

use super::types::{ForumRef, Thread, ThreadWithForum};
use crate::db::Author;
use crate::{NaranjoError, Result};

const THREAD_COLUMNS: &str = "t.id, t.forum_id, t.title, t.created_at, t.last_post_at,
     u.id AS author_id, u.username AS author_username, u.avatar_url AS author_avatar_url";

/// Repository for thread lookups.
pub struct ThreadRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ThreadRepository<'a> {
    /// Create a new ThreadRepository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a thread by ID, joined with its author.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Thread>> {
        let sql = format!(
            "SELECT {THREAD_COLUMNS}
             FROM threads t
             JOIN users u ON u.id = t.created_by
             WHERE t.id = ?"
        );
        let row = sqlx::query_as::<_, ThreadRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;

        Ok(row.map(ThreadRow::into_thread))
    }

    /// Get a thread with its forum reference.
    pub async fn get_with_forum(&self, id: i64) -> Result<Option<ThreadWithForum>> {
        let sql = format!(
            "SELECT {THREAD_COLUMNS},
                    f.slug AS forum_slug, f.title AS forum_title
             FROM threads t
             JOIN users u ON u.id = t.created_by
             JOIN forums f ON f.id = t.forum_id
             WHERE t.id = ?"
        );
        let row = sqlx::query_as::<_, ThreadForumRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;

        Ok(row.map(|row| {
            let forum = ForumRef {
                id: row.thread.forum_id,
                slug: row.forum_slug,
                title: row.forum_title,
            };
            ThreadWithForum {
                thread: row.thread.into_thread(),
                forum,
            }
        }))
    }

    /// List a forum's threads, most recently active first.
    pub async fn list_by_forum(&self, forum_id: i64) -> Result<Vec<Thread>> {
        let sql = format!(
            "SELECT {THREAD_COLUMNS}
             FROM threads t
             JOIN users u ON u.id = t.created_by
             WHERE t.forum_id = ?
             ORDER BY COALESCE(t.last_post_at, t.created_at) DESC, t.id DESC"
        );
        let rows = sqlx::query_as::<_, ThreadRow>(&sql)
            .bind(forum_id)
            .fetch_all(self.pool)
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(ThreadRow::into_thread).collect())
    }

    /// Check whether a thread exists.
    pub async fn exists(&self, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM threads WHERE id = ?)")
            .bind(id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(exists)
    }
}

#[derive(sqlx::FromRow)]
struct ThreadRow {
    id: i64,
    forum_id: i64,
    title: String,
    created_at: String,
    last_post_at: Option<String>,
    author_id: i64,
    author_username: String,
    author_avatar_url: String,
}

impl ThreadRow {
    fn into_thread(self) -> Thread {
        Thread {
            id: self.id,
            forum_id: self.forum_id,
            title: self.title,
            created_at: self.created_at,
            last_post_at: self.last_post_at,
            author: Author {
                id: self.author_id,
                username: self.author_username,
                avatar_url: self.author_avatar_url,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct ThreadForumRow {
    #[sqlx(flatten)]
    thread: ThreadRow,
    forum_slug: String,
    forum_title: String,
}
