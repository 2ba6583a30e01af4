//! Forum repository.

use sqlx::SqlitePool;

use super::types::{Forum, NewForum};
use crate::datetime;
use crate::db::map_write_error;
use crate::{NaranjoError, Result};

/// Repository for forum CRUD operations.
pub struct ForumRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ForumRepository<'a> {
    /// Create a new ForumRepository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a forum. A duplicate slug yields `Conflict`.
    pub async fn create(&self, new_forum: &NewForum) -> Result<Forum> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO forums (slug, title, description, created_by, created_at)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&new_forum.slug)
        .bind(&new_forum.title)
        .bind(&new_forum.description)
        .bind(new_forum.created_by)
        .bind(datetime::now_iso())
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| NaranjoError::NotFound("forum".to_string()))
    }

    /// Get a forum by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Forum>> {
        let row = sqlx::query_as::<_, ForumRow>(
            "SELECT id, slug, title, description, created_by, created_at FROM forums WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| NaranjoError::Database(e.to_string()))?;

        Ok(row.map(ForumRow::into_forum))
    }

    /// Get a forum by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Forum>> {
        let row = sqlx::query_as::<_, ForumRow>(
            "SELECT id, slug, title, description, created_by, created_at FROM forums WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| NaranjoError::Database(e.to_string()))?;

        Ok(row.map(ForumRow::into_forum))
    }

    /// List all forums, newest first.
    pub async fn list(&self) -> Result<Vec<Forum>> {
        let rows = sqlx::query_as::<_, ForumRow>(
            "SELECT id, slug, title, description, created_by, created_at
             FROM forums ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| NaranjoError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(ForumRow::into_forum).collect())
    }
}

#[derive(sqlx::FromRow)]
struct ForumRow {
    id: i64,
    slug: String,
    title: String,
    description: String,
    created_by: i64,
    created_at: String,
}

impl ForumRow {
    fn into_forum(self) -> Forum {
        Forum {
            id: self.id,
            slug: self.slug,
            title: self.title,
            description: self.description,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::Database;

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("admin", "admin@example.com", "hash"))
            .await
            .unwrap();
        (db, user.id)
    }

    fn new_forum(slug: &str, created_by: i64) -> NewForum {
        NewForum {
            slug: slug.to_string(),
            title: format!("Forum {slug}"),
            description: String::new(),
            created_by,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_slug() {
        let (db, admin_id) = setup().await;
        let repo = ForumRepository::new(db.pool());

        let forum = repo.create(&new_forum("general", admin_id)).await.unwrap();
        assert_eq!(forum.slug, "general");
        assert_eq!(forum.created_by, admin_id);

        let found = repo.get_by_slug("general").await.unwrap().unwrap();
        assert_eq!(found.id, forum.id);
        assert!(repo.get_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let (db, admin_id) = setup().await;
        let repo = ForumRepository::new(db.pool());

        repo.create(&new_forum("general", admin_id)).await.unwrap();
        let err = repo.create(&new_forum("general", admin_id)).await.unwrap_err();
        assert!(matches!(err, NaranjoError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_title_check_constraint() {
        let (db, admin_id) = setup().await;
        let mut forum = new_forum("ok", admin_id);
        forum.title = "ab".to_string();

        let err = ForumRepository::new(db.pool()).create(&forum).await.unwrap_err();
        assert!(matches!(err, NaranjoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (db, admin_id) = setup().await;
        let repo = ForumRepository::new(db.pool());

        let first = repo.create(&new_forum("first", admin_id)).await.unwrap();
        let second = repo.create(&new_forum("second", admin_id)).await.unwrap();

        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
