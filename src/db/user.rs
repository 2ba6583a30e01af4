//! User model for Naranjo.

use std::fmt;
use std::str::FromStr;

/// User role for permission management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Regular member.
    #[default]
    User,
    /// Administrator (may create forums).
    Admin,
}

impl Role {
    /// Convert role to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// User entity representing a registered account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login handle, unique case-insensitively.
    pub username: String,
    /// Lowercased email, unique case-insensitively.
    pub email: String,
    /// Password hash (Argon2 PHC string).
    pub password_hash: String,
    /// Avatar URL, empty when unset.
    pub avatar_url: String,
    /// User role for permissions.
    pub role: Role,
    /// Whether the email address has been confirmed.
    pub email_verified: bool,
    /// Pending verification token.
    pub email_verification_token: Option<String>,
    /// Expiry of the pending verification token.
    pub email_verification_expires_at: Option<String>,
    /// Account creation timestamp.
    pub created_at: String,
}

impl User {
    /// Check if this user is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Public view of a user attached to content they wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Avatar URL, empty when unset.
    pub avatar_url: String,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login handle.
    pub username: String,
    /// Email (already normalized).
    pub email: String,
    /// Password hash.
    pub password_hash: String,
    /// Initial role.
    pub role: Role,
    /// Initial verification state.
    pub email_verified: bool,
    /// Verification token issued at registration.
    pub email_verification_token: Option<String>,
    /// Expiry of that token.
    pub email_verification_expires_at: Option<String>,
}

impl NewUser {
    /// Create a new regular user with required fields.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: Role::User,
            email_verified: false,
            email_verification_token: None,
            email_verification_expires_at: None,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Attach a verification token and its expiry.
    pub fn with_verification(mut self, token: impl Into<String>, expires_at: impl Into<String>) -> Self {
        self.email_verification_token = Some(token.into());
        self.email_verification_expires_at = Some(expires_at.into());
        self
    }

    /// Mark the account as verified from the start.
    pub fn verified(mut self, verified: bool) -> Self {
        self.email_verified = verified;
        self
    }
}

/// Editable profile fields.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    /// New username.
    pub username: String,
    /// New avatar URL (may be empty).
    pub avatar_url: String,
}
