//! Error types for Naranjo.

use thiserror::Error;

/// Common error type for Naranjo.
#[derive(Error, Debug)]
pub enum NaranjoError {
    /// Database error.
    ///
    /// Wraps any sqlx failure that is not a constraint the caller can act on.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller is not (or no longer) authenticated.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The caller is authenticated but lacks the required role.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A uniqueness rule was violated (username, email, slug).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Too many attempts for the current window.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until the window resets.
        retry_after_secs: u64,
    },

    /// Password hashing failed.
    #[error("password error: {0}")]
    Password(#[from] crate::auth::PasswordError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl NaranjoError {
    /// The message that is safe to show to API clients.
    ///
    /// Internal variants are collapsed into a generic message.
    pub fn public_message(&self) -> String {
        match self {
            NaranjoError::Auth(msg)
            | NaranjoError::Permission(msg)
            | NaranjoError::Validation(msg)
            | NaranjoError::Conflict(msg) => msg.clone(),
            NaranjoError::NotFound(what) => format!("{what} not found"),
            NaranjoError::RateLimited { .. } => {
                "too many attempts, please try again later".to_string()
            }
            _ => "an internal error occurred".to_string(),
        }
    }
}

impl From<sqlx::Error> for NaranjoError {
    fn from(e: sqlx::Error) -> Self {
        NaranjoError::Database(e.to_string())
    }
}

/// Result type alias for Naranjo operations.
pub type Result<T> = std::result::Result<T, NaranjoError>;
