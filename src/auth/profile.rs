//! Profile editing.

use super::registration::AuthService;
use super::validation::{validate_avatar_url, validate_username};
use crate::db::{ProfileUpdate, User, UserRepository};
use crate::{NaranjoError, Result};

impl AuthService<'_> {
    /// Change a user's username and avatar URL.
    ///
    /// The username follows the registration rules; the avatar is trimmed
    /// and may be empty.
    pub async fn update_profile(&self, user_id: i64, username: &str, avatar_url: &str) -> Result<User> {
        validate_username(username)?;
        let avatar_url = avatar_url.trim();
        validate_avatar_url(avatar_url)?;

        let repo = UserRepository::new(self.db.pool());
        if repo.username_taken(username, Some(user_id)).await? {
            return Err(NaranjoError::Conflict("username already taken".to_string()));
        }

        let update = ProfileUpdate {
            username: username.to_string(),
            avatar_url: avatar_url.to_string(),
        };
        let user = repo
            .update_profile(user_id, &update)
            .await?
            .ok_or_else(|| NaranjoError::NotFound("user".to_string()))?;

        tracing::info!(user_id, "Profile updated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use crate::mailer::MemoryMailer;
    use crate::Database;
    use std::sync::Arc;

    async fn setup() -> (Database, User, User) {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let alice = repo
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();
        let bob = repo
            .create(&NewUser::new("bob", "bob@example.com", "hash"))
            .await
            .unwrap();
        (db, alice, bob)
    }

    #[tokio::test]
    async fn test_update_profile_success() {
        let (db, alice, _) = setup().await;
        let service = AuthService::new(&db, Arc::new(MemoryMailer::new()));

        let user = service
            .update_profile(alice.id, "Alicia", "  https://img.example/a.png ")
            .await
            .unwrap();
        assert_eq!(user.username, "Alicia");
        assert_eq!(user.avatar_url, "https://img.example/a.png");
    }

    #[tokio::test]
    async fn test_update_profile_keeps_own_name() {
        let (db, alice, _) = setup().await;
        let service = AuthService::new(&db, Arc::new(MemoryMailer::new()));
        assert!(service.update_profile(alice.id, "ALICE", "").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_conflict() {
        let (db, alice, _) = setup().await;
        let service = AuthService::new(&db, Arc::new(MemoryMailer::new()));
        let err = service.update_profile(alice.id, "Bob", "").await.unwrap_err();
        assert!(matches!(err, NaranjoError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_profile_validation() {
        let (db, alice, _) = setup().await;
        let service = AuthService::new(&db, Arc::new(MemoryMailer::new()));

        assert!(matches!(
            service.update_profile(alice.id, "al", "").await,
            Err(NaranjoError::Validation(_))
        ));
        assert!(matches!(
            service.update_profile(alice.id, "alice ", "").await,
            Err(NaranjoError::Validation(_))
        ));
        assert!(matches!(
            service.update_profile(alice.id, "alice", &"x".repeat(501)).await,
            Err(NaranjoError::Validation(_))
        ));
    }
}
