//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthService, SessionKeys};
use crate::config::{AuthConfig, Config, WebConfig};
use crate::mailer::Mailer;
use crate::rate_limit::{FixedWindowLimiter, RateLimitConfig, RateLimiter};
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database pool.
    pub db: Database,
    /// Session token signing keys.
    pub session_keys: SessionKeys,
    /// Attempt counter for rate-limited endpoints.
    pub limiter: Arc<dyn RateLimiter>,
    /// Outgoing mail.
    pub mailer: Arc<dyn Mailer>,
    /// Authentication settings.
    pub auth: AuthConfig,
    /// Web layer settings.
    pub web: WebConfig,
    /// Configured public origin, if any.
    pub base_url: Option<String>,
}

impl AppState {
    /// Build the state from configuration.
    pub fn new(db: Database, config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        let ttl = Duration::from_secs(config.auth.session_ttl_days * 24 * 60 * 60);
        Self {
            db,
            session_keys: SessionKeys::new(&config.auth.session_secret, ttl),
            limiter: Arc::new(FixedWindowLimiter::new()),
            mailer,
            auth: config.auth.clone(),
            web: config.web.clone(),
            base_url: config.public_base_url(),
        }
    }

    /// Replace the rate limiter.
    pub fn with_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Limits applied to registration attempts.
    pub fn register_limit(&self) -> RateLimitConfig {
        RateLimitConfig::new(
            self.auth.register_rate_limit,
            self.auth.register_rate_window_secs,
        )
    }

    /// The admin allowlist, if configured.
    pub fn admin_email(&self) -> Option<&str> {
        self.auth.admin_email.as_deref()
    }

    /// Account service bound to this state.
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(&self.db, self.mailer.clone())
            .with_verification_ttl_hours(self.auth.verification_ttl_hours)
    }
}
