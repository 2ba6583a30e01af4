//! Naranjo - a small multi-forum bulletin board.
//!
//! Visitors register and sign in, post short messages to a public wall,
//! and discuss in threads inside admin-created forums. Everything is
//! served as a JSON API backed by SQLite.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod forum;
pub mod listing;
pub mod logging;
pub mod mailer;
pub mod rate_limit;
pub mod text;
pub mod wall;
pub mod web;

pub use auth::{
    hash_password, require_admin, require_session, validate_password, verify_password,
    AuthService, PasswordError, PermissionError, RegistrationRequest, SessionKeys, SessionState,
    ValidationError,
};
pub use config::Config;
pub use db::{Author, Database, NewUser, Role, User, UserRepository};
pub use error::{NaranjoError, Result};
pub use forum::{slugify, Forum, ForumService, Post, Thread};
pub use mailer::{LogMailer, Mailer, MemoryMailer, OutgoingMail};
pub use rate_limit::{FixedWindowLimiter, RateLimitConfig, RateLimitResult, RateLimiter};
pub use wall::{Message, WallService};
pub use web::{create_router, AppState, WebServer};
