//! Account registration.

use std::sync::Arc;

use chrono::{Duration, Utc};

use super::password::hash_password;
use super::validation::{
    normalize_email, validate_email, validate_registration_password, validate_username,
};
use super::verification::{generate_verification_token, verification_link};
use crate::db::{NewUser, User, UserRepository};
use crate::mailer::{Mailer, OutgoingMail};
use crate::{datetime, Database, NaranjoError, Result};

/// Registration request data.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    /// Desired username, exactly as submitted.
    pub username: String,
    /// Email address, normalized during registration.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Account operations: registration, login, email verification and profile.
pub struct AuthService<'a> {
    pub(super) db: &'a Database,
    pub(super) mailer: Arc<dyn Mailer>,
    pub(super) verification_ttl: Duration,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService.
    pub fn new(db: &'a Database, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            mailer,
            verification_ttl: Duration::hours(24),
        }
    }

    /// Override the verification token lifetime.
    pub fn with_verification_ttl_hours(mut self, hours: i64) -> Self {
        self.verification_ttl = Duration::hours(hours);
        self
    }

    /// Register a new account.
    ///
    /// Input is fully validated before the store is touched. The account
    /// starts out verified; a verification link is still issued and sent.
    /// `base_url` is the public origin used to build that link.
    pub async fn register(&self, request: &RegistrationRequest, base_url: &str) -> Result<User> {
        let username = request.username.as_str();
        let email = normalize_email(&request.email);

        validate_username(username)?;
        validate_email(&email)?;
        validate_registration_password(&request.password)?;

        // Fast path for a friendly message; the unique index has the final word.
        let repo = UserRepository::new(self.db.pool());
        if repo.username_taken(username, None).await? {
            return Err(NaranjoError::Conflict("username already taken".to_string()));
        }
        if repo.email_exists(&email).await? {
            return Err(NaranjoError::Conflict("email already registered".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let token = generate_verification_token();
        let expires_at = datetime::format(&(Utc::now() + self.verification_ttl));

        let new_user = NewUser::new(username, &email, password_hash)
            .with_verification(&token, expires_at)
            .verified(true);
        let user = repo.create(&new_user).await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        self.send_verification(&user, &token, base_url);

        Ok(user)
    }

    /// Send the verification email. Delivery problems are logged, not returned.
    pub(super) fn send_verification(&self, user: &User, token: &str, base_url: &str) {
        let link = verification_link(base_url, token);
        let mail = OutgoingMail::verification(
            &user.email,
            &user.username,
            &link,
            self.verification_ttl.num_hours(),
        );
        if let Err(e) = self.mailer.send(mail) {
            tracing::warn!(user_id = user.id, error = %e, "Failed to send verification email");
        }
    }
}
