//! Authentication module for Naranjo.
//!
//! Password hashing, registration, login, email verification, profile
//! editing, session tokens and the authorization gates.

mod login;
mod password;
pub mod permission;
mod profile;
mod registration;
pub mod session;
pub mod validation;
mod verification;

pub use login::INVALID_CREDENTIALS;
pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use permission::{require_admin, require_session, PermissionError};
pub use registration::{AuthService, RegistrationRequest};
pub use session::{resolve, SessionKeys, SessionState, SESSION_COOKIE};
pub use validation::ValidationError;
pub use verification::{generate_verification_token, verification_link};
