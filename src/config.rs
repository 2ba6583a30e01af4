//! Configuration module for Naranjo.

use serde::Deserialize;
use std::path::Path;

use crate::{NaranjoError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public base URL used in links sent by email.
    ///
    /// When unset, the URL is derived from the incoming request.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/naranjo.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/naranjo.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Authentication and session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign session cookies.
    #[serde(default)]
    pub session_secret: String,
    /// Session lifetime in days.
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: u64,
    /// Mark the session cookie `Secure` (HTTPS deployments).
    #[serde(default)]
    pub secure_cookies: bool,
    /// When set, only this email may act as administrator.
    #[serde(default)]
    pub admin_email: Option<String>,
    /// Registration attempts allowed per client address and window.
    #[serde(default = "default_register_rate_limit")]
    pub register_rate_limit: u32,
    /// Registration rate window in seconds.
    #[serde(default = "default_register_rate_window")]
    pub register_rate_window_secs: u64,
    /// Lifetime of an email verification token in hours.
    #[serde(default = "default_verification_ttl_hours")]
    pub verification_ttl_hours: i64,
}

/// Longest accepted session lifetime, in days.
pub const MAX_SESSION_TTL_DAYS: u64 = 3650;

/// Longest accepted verification token lifetime, in hours.
pub const MAX_VERIFICATION_TTL_HOURS: i64 = 24 * 365;

fn default_session_ttl_days() -> u64 {
    30
}

fn default_register_rate_limit() -> u32 {
    5
}

fn default_register_rate_window() -> u64 {
    600 // 10 minutes
}

fn default_verification_ttl_hours() -> i64 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            session_ttl_days: default_session_ttl_days(),
            secure_cookies: false,
            admin_email: None,
            register_rate_limit: default_register_rate_limit(),
            register_rate_window_secs: default_register_rate_window(),
            verification_ttl_hours: default_verification_ttl_hours(),
        }
    }
}

/// Web layer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve static files.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    ///
    /// Only enable this behind a reverse proxy that sets these headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_static_path() -> String {
    "public".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            serve_static: false,
            static_path: default_static_path(),
            trust_proxy_headers: false,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Web configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(NaranjoError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| NaranjoError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `HOST`, `PORT`: listen address
    /// - `BASE_URL`: public base URL for verification links
    /// - `ADMIN_EMAIL`: administrator allowlist
    /// - `NARANJO_SESSION_SECRET`: session signing secret
    /// - `NARANJO_DB_PATH`: database file
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid PORT"),
            }
        }
        if let Some(base_url) = get("BASE_URL") {
            self.server.base_url = Some(base_url);
        }
        if let Some(admin_email) = get("ADMIN_EMAIL") {
            self.auth.admin_email = Some(admin_email);
        }
        if let Some(secret) = get("NARANJO_SESSION_SECRET") {
            self.auth.session_secret = secret;
        }
        if let Some(path) = get("NARANJO_DB_PATH") {
            self.database.path = path;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the session secret is empty
    /// - the registration limit or its window is zero
    /// - a session or verification lifetime is zero or out of range
    /// - the base URL is not an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.auth.session_secret.is_empty() {
            return Err(NaranjoError::Config(
                "session_secret is not set. \
                 Set it in config.toml or via NARANJO_SESSION_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.auth.register_rate_limit == 0 || self.auth.register_rate_window_secs == 0 {
            return Err(NaranjoError::Config(
                "register_rate_limit and register_rate_window_secs must be positive".to_string(),
            ));
        }
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&self.auth.session_ttl_days) {
            return Err(NaranjoError::Config(format!(
                "session_ttl_days must be between 1 and {MAX_SESSION_TTL_DAYS}"
            )));
        }
        if !(1..=MAX_VERIFICATION_TTL_HOURS).contains(&self.auth.verification_ttl_hours) {
            return Err(NaranjoError::Config(format!(
                "verification_ttl_hours must be between 1 and {MAX_VERIFICATION_TTL_HOURS}"
            )));
        }
        if let Some(base_url) = &self.server.base_url {
            let parsed = url::Url::parse(base_url)
                .map_err(|e| NaranjoError::Config(format!("invalid base_url: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(NaranjoError::Config(
                    "base_url must use http or https".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The configured public base URL without trailing slashes.
    pub fn public_base_url(&self) -> Option<String> {
        self.server
            .base_url
            .as_deref()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
    }
}
