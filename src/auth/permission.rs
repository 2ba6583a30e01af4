//! Authorization checks.
//!
//! `require_session` and `require_admin` are the two gates in front of
//! mutating operations. The web layer wraps them in extractors.

use thiserror::Error;

use super::session::SessionState;
use crate::db::User;

/// Permission-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// No session cookie was sent.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A session cookie was sent but is no longer valid.
    #[error("invalid session")]
    InvalidSession,

    /// The user is not an administrator.
    #[error("admin access required")]
    AdminRequired,
}

impl From<PermissionError> for crate::NaranjoError {
    fn from(e: PermissionError) -> Self {
        match e {
            PermissionError::NotAuthenticated | PermissionError::InvalidSession => {
                crate::NaranjoError::Auth(e.to_string())
            }
            PermissionError::AdminRequired => crate::NaranjoError::Permission(e.to_string()),
        }
    }
}

/// Require a resolved user.
pub fn require_session(state: &SessionState) -> Result<&User, PermissionError> {
    match state {
        SessionState::Active(user) => Ok(user),
        SessionState::Stale => Err(PermissionError::InvalidSession),
        SessionState::Anonymous => Err(PermissionError::NotAuthenticated),
    }
}

/// Require an administrator.
///
/// When `admin_email` is configured, the user's email must also match it
/// (case-insensitively).
///
/// # Examples
///
/// ```
/// use naranjo::auth::permission::{require_admin, PermissionError};
/// use naranjo::db::{Role, User};
///
/// let mut user = User {
///     id: 1,
///     username: "boss".into(),
///     email: "boss@example.com".into(),
///     password_hash: String::new(),
///     avatar_url: String::new(),
///     role: Role::Admin,
///     email_verified: true,
///     email_verification_token: None,
///     email_verification_expires_at: None,
///     created_at: String::new(),
/// };
/// assert!(require_admin(&user, None).is_ok());
/// assert!(require_admin(&user, Some("other@example.com")).is_err());
///
/// user.role = Role::User;
/// assert_eq!(require_admin(&user, None), Err(PermissionError::AdminRequired));
/// ```
pub fn require_admin(user: &User, admin_email: Option<&str>) -> Result<(), PermissionError> {
    if !user.is_admin() {
        return Err(PermissionError::AdminRequired);
    }
    if let Some(allowed) = admin_email.map(str::trim).filter(|e| !e.is_empty()) {
        if !user.email.eq_ignore_ascii_case(allowed) {
            return Err(PermissionError::AdminRequired);
        }
    }
    Ok(())
}
