//! Forum service: forums, threads and posts.

use super::post_repository::PostRepository;
use super::repository::ForumRepository;
use super::slug::slugify;
use super::thread_repository::ThreadRepository;
use super::types::{
    Forum, ForumRef, NewForum, Post, Thread, ThreadWithForum, FORUM_TITLE_LENGTH,
    MAX_FORUM_DESCRIPTION_LENGTH, MAX_POST_LENGTH, THREAD_TITLE_LENGTH,
};
use crate::datetime;
use crate::db::{map_write_error, User};
use crate::listing::POST_LIMIT;
use crate::text::trimmed_within;
use crate::{Database, NaranjoError, Result};

/// Service for forum, thread and post operations.
pub struct ForumService<'a> {
    db: &'a Database,
}

impl<'a> ForumService<'a> {
    /// Create a new ForumService.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// List all forums, newest first.
    pub async fn list_forums(&self) -> Result<Vec<Forum>> {
        ForumRepository::new(self.db.pool()).list().await
    }

    /// Create a forum. The caller must already be authorized as an admin.
    pub async fn create_forum(&self, admin: &User, title: &str, description: &str) -> Result<Forum> {
        if !admin.is_admin() {
            return Err(NaranjoError::Permission("admin access required".to_string()));
        }

        let (min, max) = FORUM_TITLE_LENGTH;
        let title = trimmed_within("title", title, min, max)?;
        let description =
            trimmed_within("description", description, 0, MAX_FORUM_DESCRIPTION_LENGTH)?;

        let slug = slugify(title);
        if slug.is_empty() {
            return Err(NaranjoError::Validation(
                "title must contain letters or digits".to_string(),
            ));
        }

        let forum = ForumRepository::new(self.db.pool())
            .create(&NewForum {
                slug,
                title: title.to_string(),
                description: description.to_string(),
                created_by: admin.id,
            })
            .await?;

        tracing::info!(forum_id = forum.id, slug = %forum.slug, user_id = admin.id, "Forum created");
        Ok(forum)
    }

    /// Look up a forum by slug, failing with `NotFound`.
    pub async fn get_forum(&self, slug: &str) -> Result<Forum> {
        ForumRepository::new(self.db.pool())
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| NaranjoError::NotFound("forum".to_string()))
    }

    /// List a forum's threads, most recently active first.
    pub async fn list_threads(&self, slug: &str) -> Result<(ForumRef, Vec<Thread>)> {
        let forum = self.get_forum(slug).await?;
        let threads = ThreadRepository::new(self.db.pool())
            .list_by_forum(forum.id)
            .await?;
        Ok((forum.to_ref(), threads))
    }

    /// Open a thread in the forum named by `slug`, seeded with its first post.
    pub async fn create_thread(
        &self,
        author: &User,
        slug: &str,
        title: &str,
        content: &str,
    ) -> Result<(Thread, Post)> {
        let (min, max) = THREAD_TITLE_LENGTH;
        let title = trimmed_within("title", title, min, max)?;
        let content = trimmed_within("content", content, 1, MAX_POST_LENGTH)?;

        let forum = self.get_forum(slug).await?;
        self.create_thread_with_first_post(forum.id, author.id, title, content)
            .await
    }

    /// Insert a thread and its first post atomically.
    ///
    /// Inputs must already be validated. Either both rows exist afterwards
    /// or neither does.
    pub async fn create_thread_with_first_post(
        &self,
        forum_id: i64,
        author_id: i64,
        title: &str,
        content: &str,
    ) -> Result<(Thread, Post)> {
        let now = datetime::now_iso();

        let mut tx = self.db.begin().await?;

        let thread_id: i64 = sqlx::query_scalar(
            "INSERT INTO threads (forum_id, title, created_by, created_at, last_post_at)
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(forum_id)
        .bind(title)
        .bind(author_id)
        .bind(&now)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        let post_id: i64 = sqlx::query_scalar(
            "INSERT INTO posts (thread_id, author_id, content, created_at)
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(thread_id)
        .bind(author_id)
        .bind(content)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit()
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;

        tracing::info!(thread_id, forum_id, user_id = author_id, "Thread created");

        let thread = ThreadRepository::new(self.db.pool())
            .get_by_id(thread_id)
            .await?
            .ok_or_else(|| NaranjoError::NotFound("thread".to_string()))?;
        let post = PostRepository::new(self.db.pool())
            .get_by_id(post_id)
            .await?
            .ok_or_else(|| NaranjoError::NotFound("post".to_string()))?;
        Ok((thread, post))
    }

    /// Get a thread with its forum reference.
    pub async fn get_thread(&self, thread_id: i64) -> Result<ThreadWithForum> {
        ThreadRepository::new(self.db.pool())
            .get_with_forum(thread_id)
            .await?
            .ok_or_else(|| NaranjoError::NotFound("thread".to_string()))
    }

    /// List a thread's posts, oldest first.
    ///
    /// `limit` defaults to 100 and is capped at 200.
    pub async fn list_posts(&self, thread_id: i64, limit: Option<i64>) -> Result<Vec<Post>> {
        if !ThreadRepository::new(self.db.pool()).exists(thread_id).await? {
            return Err(NaranjoError::NotFound("thread".to_string()));
        }
        PostRepository::new(self.db.pool())
            .list_by_thread(thread_id, POST_LIMIT.resolve(limit))
            .await
    }

    /// Reply to a thread.
    ///
    /// The insert and the `last_post_at` bump share one transaction, and
    /// `last_post_at` only ever moves forward.
    pub async fn create_post(&self, author: &User, thread_id: i64, content: &str) -> Result<Post> {
        let content = trimmed_within("content", content, 1, MAX_POST_LENGTH)?;

        if !ThreadRepository::new(self.db.pool()).exists(thread_id).await? {
            return Err(NaranjoError::NotFound("thread".to_string()));
        }

        let now = datetime::now_iso();
        let mut tx = self.db.begin().await?;

        let post_id: i64 = sqlx::query_scalar(
            "INSERT INTO posts (thread_id, author_id, content, created_at)
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(thread_id)
        .bind(author.id)
        .bind(content)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        sqlx::query(
            "UPDATE threads SET last_post_at = ?1
             WHERE id = ?2
               AND ?1 >= created_at
               AND (last_post_at IS NULL OR last_post_at < ?1)",
        )
        .bind(&now)
        .bind(thread_id)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit()
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;

        tracing::debug!(post_id, thread_id, user_id = author.id, "Post created");

        PostRepository::new(self.db.pool())
            .get_by_id(post_id)
            .await?
            .ok_or_else(|| NaranjoError::NotFound("post".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, Role, UserRepository};

    struct Fixture {
        db: Database,
        admin: User,
        member: User,
    }

    async fn setup() -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let admin = repo
            .create(&NewUser::new("admin", "admin@example.com", "hash").with_role(Role::Admin))
            .await
            .unwrap();
        let member = repo
            .create(&NewUser::new("member", "member@example.com", "hash"))
            .await
            .unwrap();
        Fixture { db, admin, member }
    }

    async fn thread_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM threads")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_forum_derives_slug() {
        let f = setup().await;
        let forum = ForumService::new(&f.db)
            .create_forum(&f.admin, "  Música Retro!!  ", "  Chiptunes  ")
            .await
            .unwrap();
        assert_eq!(forum.slug, "musica-retro");
        assert_eq!(forum.title, "Música Retro!!");
        assert_eq!(forum.description, "Chiptunes");
    }

    #[tokio::test]
    async fn test_create_forum_rules() {
        let f = setup().await;
        let service = ForumService::new(&f.db);

        assert!(matches!(
            service.create_forum(&f.member, "General", "").await,
            Err(NaranjoError::Permission(_))
        ));
        assert!(matches!(
            service.create_forum(&f.admin, "!!!", "").await,
            Err(NaranjoError::Validation(_))
        ));
        assert!(matches!(
            service.create_forum(&f.admin, "ab", "").await,
            Err(NaranjoError::Validation(_))
        ));
        assert!(matches!(
            service.create_forum(&f.admin, "General", &"d".repeat(141)).await,
            Err(NaranjoError::Validation(_))
        ));

        service.create_forum(&f.admin, "General", "").await.unwrap();
        assert!(matches!(
            service.create_forum(&f.admin, "general!", "").await,
            Err(NaranjoError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_list_forums_newest_first() {
        let f = setup().await;
        let service = ForumService::new(&f.db);
        service.create_forum(&f.admin, "Primero", "").await.unwrap();
        service.create_forum(&f.admin, "Segundo", "").await.unwrap();

        let slugs: Vec<String> = service
            .list_forums()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.slug)
            .collect();
        assert_eq!(slugs, vec!["segundo", "primero"]);
    }

    #[tokio::test]
    async fn test_thread_title_bounds() {
        let f = setup().await;
        let service = ForumService::new(&f.db);
        service.create_forum(&f.admin, "General", "").await.unwrap();

        for (len, ok) in [(2, false), (3, true), (80, true), (81, false)] {
            let result = service
                .create_thread(&f.member, "general", &"t".repeat(len), "body")
                .await;
            assert_eq!(result.is_ok(), ok, "title length {len}");
        }
        assert_eq!(thread_count(&f.db).await, 2);
    }

    #[tokio::test]
    async fn test_create_thread_seeds_first_post() {
        let f = setup().await;
        let service = ForumService::new(&f.db);
        service.create_forum(&f.admin, "General", "").await.unwrap();

        let (thread, post) = service
            .create_thread(&f.member, "general", " Hola ", " primer post ")
            .await
            .unwrap();
        assert_eq!(thread.title, "Hola");
        assert_eq!(thread.author.username, "member");
        assert_eq!(thread.last_post_at.as_deref(), Some(thread.created_at.as_str()));
        assert_eq!(post.thread_id, thread.id);
        assert_eq!(post.content, "primer post");

        let posts = service.list_posts(thread.id, None).await.unwrap();
        assert_eq!(posts.len(), 1);
    }

    #[tokio::test]
    async fn test_create_thread_unknown_forum() {
        let f = setup().await;
        let err = ForumService::new(&f.db)
            .create_thread(&f.member, "nope", "Title", "body")
            .await
            .unwrap_err();
        assert!(matches!(err, NaranjoError::NotFound(_)));

        let err = ForumService::new(&f.db).list_threads("nope").await.unwrap_err();
        assert!(matches!(err, NaranjoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_thread_creation_rolls_back_when_post_insert_fails() {
        let f = setup().await;
        let service = ForumService::new(&f.db);
        service.create_forum(&f.admin, "General", "").await.unwrap();

        sqlx::query(
            "CREATE TRIGGER fail_post_insert BEFORE INSERT ON posts
             BEGIN SELECT RAISE(ABORT, 'simulated storage failure'); END",
        )
        .execute(f.db.pool())
        .await
        .unwrap();

        let result = service
            .create_thread(&f.member, "general", "Doomed", "body")
            .await;
        assert!(result.is_err());
        assert_eq!(thread_count(&f.db).await, 0);
    }

    #[tokio::test]
    async fn test_posting_resorts_threads() {
        let f = setup().await;
        let service = ForumService::new(&f.db);
        service.create_forum(&f.admin, "General", "").await.unwrap();

        let (older, _) = service
            .create_thread(&f.member, "general", "Older", "a")
            .await
            .unwrap();
        let (newer, _) = service
            .create_thread(&f.member, "general", "Newer", "b")
            .await
            .unwrap();

        let (_, threads) = service.list_threads("general").await.unwrap();
        let ids: Vec<i64> = threads.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let reply = service.create_post(&f.admin, older.id, "reply").await.unwrap();

        let (forum, threads) = service.list_threads("general").await.unwrap();
        assert_eq!(forum.slug, "general");
        let ids: Vec<i64> = threads.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
        assert_eq!(threads[0].last_post_at.as_deref(), Some(reply.created_at.as_str()));
    }

    #[tokio::test]
    async fn test_last_post_at_never_moves_backwards() {
        let f = setup().await;
        let service = ForumService::new(&f.db);
        service.create_forum(&f.admin, "General", "").await.unwrap();
        let (thread, _) = service
            .create_thread(&f.member, "general", "Thread", "a")
            .await
            .unwrap();

        let future = "2999-01-01T00:00:00.000000Z";
        sqlx::query("UPDATE threads SET last_post_at = ? WHERE id = ?")
            .bind(future)
            .bind(thread.id)
            .execute(f.db.pool())
            .await
            .unwrap();

        service.create_post(&f.member, thread.id, "late").await.unwrap();
        let fetched = service.get_thread(thread.id).await.unwrap();
        assert_eq!(fetched.thread.last_post_at.as_deref(), Some(future));
    }

    #[tokio::test]
    async fn test_posts_and_thread_lookup() {
        let f = setup().await;
        let service = ForumService::new(&f.db);
        service.create_forum(&f.admin, "General", "").await.unwrap();
        let (thread, first) = service
            .create_thread(&f.member, "general", "Thread", "first")
            .await
            .unwrap();
        let second = service.create_post(&f.admin, thread.id, "second").await.unwrap();

        let posts = service.list_posts(thread.id, None).await.unwrap();
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(service.list_posts(thread.id, Some(1)).await.unwrap().len(), 1);

        let view = service.get_thread(thread.id).await.unwrap();
        assert_eq!(view.forum.slug, "general");
        assert_eq!(view.thread.author.id, f.member.id);

        assert!(matches!(
            service.get_thread(999).await,
            Err(NaranjoError::NotFound(_))
        ));
        assert!(matches!(
            service.list_posts(999, None).await,
            Err(NaranjoError::NotFound(_))
        ));
        assert!(matches!(
            service.create_post(&f.member, 999, "x").await,
            Err(NaranjoError::NotFound(_))
        ));
        assert!(matches!(
            service.create_post(&f.member, thread.id, &"x".repeat(2001)).await,
            Err(NaranjoError::Validation(_))
        ));
    }
}
