//! Session tokens and identity resolution.
//!
//! The session cookie carries an HS256-signed token naming the user.
//! Resolution never fails on bad input: an unreadable or orphaned token
//! simply yields [`SessionState::Stale`] so the caller can clear the cookie.

use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::{User, UserRepository};
use crate::{Database, NaranjoError, Result};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "uid";

/// Claims stored in the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
    /// Token ID.
    pub jti: String,
}

/// Signing material for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionKeys {
    /// Generate a random secret, for runs without a configured one.
    ///
    /// Sessions signed with it do not survive a restart.
    pub fn generate_secret() -> String {
        super::generate_verification_token()
    }

    /// Create keys from a shared secret and a session lifetime.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id`, valid from now.
    pub fn issue(&self, user_id: i64) -> Result<String> {
        self.issue_at(user_id, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if it had been created at `issued_at`.
    pub fn issue_at(&self, user_id: i64, issued_at: i64) -> Result<String> {
        let claims = SessionClaims {
            sub: user_id,
            iat: issued_at,
            exp: issued_at + self.ttl.as_secs() as i64,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| NaranjoError::Auth(format!("failed to sign session: {e}")))
    }

    /// Verify a token and return the user ID it names.
    pub fn verify(&self, token: &str) -> Option<i64> {
        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                None
            }
        }
    }
}

/// Outcome of resolving the session cookie.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No cookie was sent.
    Anonymous,
    /// A cookie was sent but names no live user; it should be cleared.
    Stale,
    /// The cookie identifies this user.
    Active(User),
}

impl SessionState {
    /// The resolved user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Active(user) => Some(user),
            _ => None,
        }
    }

    /// Whether the caller should clear the cookie.
    pub fn is_stale(&self) -> bool {
        matches!(self, SessionState::Stale)
    }
}

/// Resolve a session cookie value into a [`SessionState`].
pub async fn resolve(db: &Database, keys: &SessionKeys, token: Option<&str>) -> Result<SessionState> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(SessionState::Anonymous);
    };
    let Some(user_id) = keys.verify(token) else {
        return Ok(SessionState::Stale);
    };

    let repo = UserRepository::new(db.pool());
    match repo.get_by_id(user_id).await? {
        Some(user) => Ok(SessionState::Active(user)),
        None => Ok(SessionState::Stale),
    }
}
