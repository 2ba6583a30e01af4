//! Result-size limits for list endpoints.

/// Default and ceiling for a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimit {
    /// Used when no usable limit was requested.
    pub default: i64,
    /// Requests above this are capped.
    pub max: i64,
}

impl ListLimit {
    /// Create a limit policy.
    pub const fn new(default: i64, max: i64) -> Self {
        Self { default, max }
    }

    /// Resolve a requested limit.
    ///
    /// Missing or non-positive requests fall back to the default.
    pub fn resolve(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(n) if n > 0 => n.min(self.max),
            _ => self.default,
        }
    }
}

/// Wall messages: 50 by default, at most 100.
pub const MESSAGE_LIMIT: ListLimit = ListLimit::new(50, 100);

/// Posts in a thread: 100 by default, at most 200.
pub const POST_LIMIT: ListLimit = ListLimit::new(100, 200);
