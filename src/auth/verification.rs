//! Email verification tokens.

use chrono::Utc;
use rand::RngCore;

use super::registration::AuthService;
use crate::db::{User, UserRepository};
use crate::{datetime, NaranjoError, Result};

/// Number of random bytes in a verification token.
const TOKEN_BYTES: usize = 32;

/// Generate a fresh token: 32 random bytes, hex encoded.
pub fn generate_verification_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Build the link a user follows to confirm their address.
pub fn verification_link(base_url: &str, token: &str) -> String {
    format!(
        "{}/api/auth/verify?token={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

impl AuthService<'_> {
    /// Confirm an email address with a token from a verification link.
    ///
    /// A token works once and only until it expires.
    pub async fn verify_email(&self, token: &str) -> Result<User> {
        let token = token.trim();
        if token.is_empty() {
            return Err(NaranjoError::Validation("token is required".to_string()));
        }

        let repo = UserRepository::new(self.db.pool());
        let user = repo
            .get_by_verification_token(token)
            .await?
            .ok_or_else(|| NaranjoError::Validation("invalid or expired token".to_string()))?;

        let expired = user
            .email_verification_expires_at
            .as_deref()
            .map_or(true, |at| datetime::is_expired(at, &Utc::now()));
        if expired {
            return Err(NaranjoError::Validation(
                "verification token has expired".to_string(),
            ));
        }

        if !repo.consume_verification_token(user.id, token).await? {
            return Err(NaranjoError::Validation("invalid or expired token".to_string()));
        }

        tracing::info!(user_id = user.id, "Email verified");
        repo.get_by_id(user.id)
            .await?
            .ok_or_else(|| NaranjoError::NotFound("user".to_string()))
    }

    /// Issue a new verification token for an unverified account and mail it.
    pub async fn resend_verification(&self, user: &User, base_url: &str) -> Result<()> {
        if user.email_verified {
            return Err(NaranjoError::Validation(
                "email already verified".to_string(),
            ));
        }

        let token = generate_verification_token();
        let expires_at = datetime::format(&(Utc::now() + self.verification_ttl));
        let repo = UserRepository::new(self.db.pool());
        if !repo.set_verification_token(user.id, &token, &expires_at).await? {
            return Err(NaranjoError::NotFound("user".to_string()));
        }

        self.send_verification(user, &token, base_url);
        Ok(())
    }
}
