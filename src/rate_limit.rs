//! Fixed-window rate limiting keyed by arbitrary strings.
//!
//! Keys look like `register:203.0.113.7`. Buckets live in memory only and
//! are lost on restart.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Configuration for one rate-limited action.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Maximum attempts allowed in the window.
    pub max_attempts: u32,
    /// Length of the window.
    pub window: Duration,
}

impl RateLimitConfig {
    /// Create a new rate limit configuration.
    pub fn new(max_attempts: u32, window_secs: u64) -> Self {
        Self {
            max_attempts,
            window: Duration::from_secs(window_secs),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // 5 registrations per 10 minutes
        Self::new(5, 600)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Attempt is allowed and has been counted.
    Allowed,
    /// Attempt is denied.
    Denied {
        /// Time until the window resets.
        retry_after: Duration,
    },
}

impl RateLimitResult {
    /// Check if the attempt is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed)
    }
}

/// A rate limiter shared by request handlers.
pub trait RateLimiter: Send + Sync {
    /// Count an attempt for `key` and decide whether it may proceed.
    fn check(&self, key: &str, config: RateLimitConfig) -> RateLimitResult;

    /// Forget everything about `key`.
    fn reset(&self, key: &str);

    /// Drop buckets whose window has elapsed. Returns how many were removed.
    fn purge_expired(&self) -> usize;
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    window_start: Instant,
    window: Duration,
}

/// In-memory fixed-window limiter.
///
/// # Example
///
/// ```
/// use naranjo::rate_limit::{FixedWindowLimiter, RateLimitConfig, RateLimiter};
///
/// let limiter = FixedWindowLimiter::new();
/// let config = RateLimitConfig::new(2, 60);
///
/// assert!(limiter.check("register:127.0.0.1", config).is_allowed());
/// assert!(limiter.check("register:127.0.0.1", config).is_allowed());
/// assert!(!limiter.check("register:127.0.0.1", config).is_allowed());
/// ```
#[derive(Debug, Default)]
pub struct FixedWindowLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl FixedWindowLimiter {
    /// Create an empty limiter.
    pub fn new() -> Self {
        Self::default()
    }

    fn buckets(&self) -> std::sync::MutexGuard<'_, HashMap<String, Bucket>> {
        self.buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// `check` against an explicit clock.
    pub fn check_at(&self, key: &str, config: RateLimitConfig, now: Instant) -> RateLimitResult {
        let mut buckets = self.buckets();

        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            window_start: now,
            window: config.window,
        });

        let elapsed = now.saturating_duration_since(bucket.window_start);
        if bucket.count == 0 || elapsed > config.window {
            *bucket = Bucket {
                count: 1,
                window_start: now,
                window: config.window,
            };
            return RateLimitResult::Allowed;
        }

        if bucket.count >= config.max_attempts {
            return RateLimitResult::Denied {
                retry_after: config.window.saturating_sub(elapsed),
            };
        }

        bucket.count += 1;
        RateLimitResult::Allowed
    }

    /// `purge_expired` against an explicit clock.
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut buckets = self.buckets();
        let before = buckets.len();
        buckets.retain(|_, b| now.saturating_duration_since(b.window_start) <= b.window);
        before - buckets.len()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.buckets().len()
    }

    /// Whether no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, key: &str, config: RateLimitConfig) -> RateLimitResult {
        self.check_at(key, config, Instant::now())
    }

    fn reset(&self, key: &str) {
        self.buckets().remove(key);
    }

    fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }
}
