//! Credential checks.

use super::password::verify_password;
use super::registration::AuthService;
use super::validation::normalize_email;
use crate::db::{User, UserRepository};
use crate::{NaranjoError, Result};

/// Message for every failed login, so callers cannot probe for accounts.
pub const INVALID_CREDENTIALS: &str = "invalid email or password";

impl AuthService<'_> {
    /// Check an email/password pair and return the account.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(NaranjoError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let repo = UserRepository::new(self.db.pool());
        let Some(user) = repo.get_by_email(&email).await? else {
            tracing::debug!("Login failed: unknown email");
            return Err(NaranjoError::Auth(INVALID_CREDENTIALS.to_string()));
        };

        if verify_password(password, &user.password_hash).is_err() {
            tracing::debug!(user_id = user.id, "Login failed: wrong password");
            return Err(NaranjoError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        tracing::info!(user_id = user.id, "User logged in");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RegistrationRequest;
    use crate::mailer::MemoryMailer;
    use crate::Database;
    use std::sync::Arc;

    async fn setup() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        AuthService::new(&db, Arc::new(MemoryMailer::new()))
            .register(
                &RegistrationRequest::new("alice", "alice@example.com", "secret1"),
                "http://x",
            )
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_login_success_case_insensitive_email() {
        let db = setup().await;
        let service = AuthService::new(&db, Arc::new(MemoryMailer::new()));
        let user = service.login(" ALICE@example.com", "secret1").await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let db = setup().await;
        let service = AuthService::new(&db, Arc::new(MemoryMailer::new()));

        let wrong_password = service.login("alice@example.com", "wrong!").await.unwrap_err();
        let unknown_email = service.login("nobody@example.com", "secret1").await.unwrap_err();

        assert!(matches!(wrong_password, NaranjoError::Auth(_)));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let db = setup().await;
        let service = AuthService::new(&db, Arc::new(MemoryMailer::new()));
        assert!(matches!(
            service.login("", "secret1").await,
            Err(NaranjoError::Validation(_))
        ));
        assert!(matches!(
            service.login("alice@example.com", "").await,
            Err(NaranjoError::Validation(_))
        ));
    }
}
