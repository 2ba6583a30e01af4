//! Input validation for accounts.
//!
//! Usernames, emails, passwords and avatar URLs. All lengths are counted in
//! characters, not bytes.

use thiserror::Error;

use super::password::MIN_PASSWORD_LENGTH;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum avatar URL length.
pub const MAX_AVATAR_URL_LENGTH: usize = 500;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username is missing.
    #[error("username is required")]
    UsernameRequired,

    /// Username has leading or trailing whitespace.
    #[error("username must not start or end with spaces")]
    UsernameWhitespace,

    /// Username length out of range.
    #[error("username must be {MIN_USERNAME_LENGTH}-{MAX_USERNAME_LENGTH} characters")]
    UsernameLength,

    /// Username contains invalid characters.
    #[error("username may only contain letters, digits, '.', '_' and '-'")]
    UsernameInvalidChars,

    /// Email is missing.
    #[error("email is required")]
    EmailRequired,

    /// Email is too long.
    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    /// Email format is invalid.
    #[error("invalid email format")]
    EmailInvalidFormat,

    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// Avatar URL is too long.
    #[error("avatar URL must be at most {MAX_AVATAR_URL_LENGTH} characters")]
    AvatarUrlTooLong,
}

impl From<ValidationError> for crate::NaranjoError {
    fn from(e: ValidationError) -> Self {
        crate::NaranjoError::Validation(e.to_string())
    }
}

fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Validate a username exactly as submitted.
///
/// # Examples
///
/// ```
/// use naranjo::auth::validation::validate_username;
///
/// assert!(validate_username("john.doe").is_ok());
/// assert!(validate_username("ab").is_err());
/// assert!(validate_username(" john").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    if username.trim() != username {
        return Err(ValidationError::UsernameWhitespace);
    }
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(ValidationError::UsernameLength);
    }
    if !username.chars().all(is_username_char) {
        return Err(ValidationError::UsernameInvalidChars);
    }
    Ok(())
}

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an already normalized email.
///
/// Accepts `local@domain.tld` where no part contains whitespace or `@`.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::EmailInvalidFormat);
    };
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::EmailInvalidFormat);
    }

    // Needs a dot with at least one character on each side.
    let has_inner_dot = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_inner_dot {
        return Err(ValidationError::EmailInvalidFormat);
    }
    Ok(())
}

/// Validate a password at registration.
pub fn validate_registration_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Validate an avatar URL (already trimmed). Empty means no avatar.
pub fn validate_avatar_url(url: &str) -> Result<(), ValidationError> {
    if url.chars().count() > MAX_AVATAR_URL_LENGTH {
        return Err(ValidationError::AvatarUrlTooLong);
    }
    Ok(())
}
