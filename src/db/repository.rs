//! User repository for Naranjo.
//!
//! CRUD operations for accounts. Uniqueness is enforced by the schema;
//! callers receive `NaranjoError::Conflict` when a write violates it.

use sqlx::SqlitePool;

use super::map_write_error;
use super::user::{NewUser, ProfileUpdate, Role, User};
use crate::datetime;
use crate::{NaranjoError, Result};

const USER_COLUMNS: &str = "id, username, email, password_hash, avatar_url, role, email_verified,
     email_verification_token, email_verification_expires_at, created_at";

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash, role, email_verified,
                                email_verification_token, email_verification_expires_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(new_user.email_verified)
        .bind(&new_user.email_verification_token)
        .bind(&new_user.email_verification_expires_at)
        .bind(datetime::now_iso())
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| NaranjoError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(row.map(UserRow::into_user))
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(row.map(UserRow::into_user))
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(row.map(UserRow::into_user))
    }

    /// Get the user holding a pending verification token.
    pub async fn get_by_verification_token(&self, token: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email_verification_token = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(token)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(row.map(UserRow::into_user))
    }

    /// Check whether a username is used by an account other than `except_id`.
    pub async fn username_taken(&self, username: &str, except_id: Option<i64>) -> Result<bool> {
        let (taken,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? AND id != COALESCE(?, -1))",
        )
        .bind(username)
        .bind(except_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(taken)
    }

    /// Check whether an email is registered.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
                .bind(email)
                .fetch_one(self.pool)
                .await
                .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(exists)
    }

    /// Update username and avatar.
    ///
    /// Returns the updated user, or None if not found.
    pub async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<Option<User>> {
        let result = sqlx::query("UPDATE users SET username = ?, avatar_url = ? WHERE id = ?")
            .bind(&update.username)
            .bind(&update.avatar_url)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Replace the pending verification token.
    pub async fn set_verification_token(
        &self,
        id: i64,
        token: &str,
        expires_at: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET email_verification_token = ?, email_verification_expires_at = ?
             WHERE id = ?",
        )
        .bind(token)
        .bind(expires_at)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark the email as verified and drop the pending token.
    ///
    /// Only succeeds while `token` is still the pending one, so a token
    /// cannot be consumed twice.
    pub async fn consume_verification_token(&self, id: i64, token: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users
             SET email_verified = 1,
                 email_verification_token = NULL,
                 email_verification_expires_at = NULL
             WHERE id = ? AND email_verification_token = ?",
        )
        .bind(id)
        .bind(token)
        .execute(self.pool)
        .await
        .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Change a user's role.
    pub async fn set_role(&self, id: i64, role: Role) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user. Their content goes with them.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .map_err(|e| NaranjoError::Database(e.to_string()))?;
        Ok(count)
    }
}

/// Internal struct for mapping database rows to User.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    avatar_url: String,
    role: String,
    email_verified: bool,
    email_verification_token: Option<String>,
    email_verification_expires_at: Option<String>,
    created_at: String,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            avatar_url: self.avatar_url,
            role: self.role.parse().unwrap_or(Role::User),
            email_verified: self.email_verified,
            email_verification_token: self.email_verification_token,
            email_verification_expires_at: self.email_verification_expires_at,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser::new(username, email, "hash")
    }

    #[tokio::test]
    async fn test_create_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&new_user("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.avatar_url, "");
        assert!(!user.email_verified);
        assert!(user.created_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&new_user("Alice", "alice@example.com"))
            .await
            .unwrap();

        assert!(repo.get_by_username("ALICE").await.unwrap().is_some());
        assert!(repo.get_by_email("Alice@Example.COM").await.unwrap().is_some());
        assert!(repo.username_taken("alice", None).await.unwrap());
        assert!(repo.email_exists("ALICE@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&new_user("alice", "a@example.com")).await.unwrap();

        let err = repo
            .create(&new_user("ALICE", "b@example.com"))
            .await
            .unwrap_err();
        match err {
            NaranjoError::Conflict(msg) => assert_eq!(msg, "username already taken"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&new_user("alice", "a@example.com")).await.unwrap();

        let err = repo
            .create(&new_user("bob", "A@EXAMPLE.com"))
            .await
            .unwrap_err();
        match err {
            NaranjoError::Conflict(msg) => assert_eq!(msg, "email already registered"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_username_taken_excludes_self() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let alice = repo.create(&new_user("alice", "a@example.com")).await.unwrap();

        assert!(!repo.username_taken("alice", Some(alice.id)).await.unwrap());
        assert!(repo.username_taken("alice", Some(alice.id + 1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let alice = repo.create(&new_user("alice", "a@example.com")).await.unwrap();

        let update = ProfileUpdate {
            username: "alicia".to_string(),
            avatar_url: "https://example.com/a.png".to_string(),
        };
        let updated = repo.update_profile(alice.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.username, "alicia");
        assert_eq!(updated.avatar_url, "https://example.com/a.png");

        assert!(repo.update_profile(999, &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_verification_token_consumed_once() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let alice = repo
            .create(&new_user("alice", "a@example.com").with_verification("tok", "2099-01-01T00:00:00.000000Z"))
            .await
            .unwrap();

        let found = repo.get_by_verification_token("tok").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);

        assert!(repo.consume_verification_token(alice.id, "tok").await.unwrap());
        assert!(!repo.consume_verification_token(alice.id, "tok").await.unwrap());

        let verified = repo.get_by_id(alice.id).await.unwrap().unwrap();
        assert!(verified.email_verified);
        assert!(verified.email_verification_token.is_none());
        assert!(verified.email_verification_expires_at.is_none());
    }

    #[tokio::test]
    async fn test_set_role_and_delete() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let alice = repo.create(&new_user("alice", "a@example.com")).await.unwrap();

        assert!(repo.set_role(alice.id, Role::Admin).await.unwrap());
        assert!(repo.get_by_id(alice.id).await.unwrap().unwrap().is_admin());

        assert!(repo.delete(alice.id).await.unwrap());
        assert!(repo.get_by_id(alice.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_username_length_enforced_by_schema() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let err = repo.create(&new_user("ab", "a@example.com")).await.unwrap_err();
        assert!(matches!(err, NaranjoError::Validation(_)));
    }
}
