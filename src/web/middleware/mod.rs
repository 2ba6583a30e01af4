//! Middleware for Web API.

pub mod cors;
pub mod rate_limit;
pub mod security;
pub mod session;

pub use cors::create_cors_layer;
pub use rate_limit::{client_ip_of, get_client_ip, register_rate_limit};
pub use security::security_headers;
pub use session::{removal_cookie, session_cookie, AdminUser, CurrentUser, Session};
