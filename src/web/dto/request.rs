//! Request DTOs for Web API.
//!
//! Every field is lenient: a missing, null or non-string value arrives as an
//! empty string and is rejected (or accepted) by the service's validation.

use serde::{Deserialize, Deserializer};

/// Deserialize any JSON value, keeping it only if it is a string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

/// Registration request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
}

/// Login request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
}

/// Profile update request.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(deserialize_with = "lenient_string")]
    pub avatar_url: String,
}

/// Wall message or post body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContentRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub content: String,
}

/// Forum creation request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateForumRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

/// Thread creation request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateThreadRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub content: String,
}

/// `?token=` query for email verification.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyQuery {
    pub token: String,
}

/// `?limit=` query for list endpoints.
///
/// Built from the raw query pairs so junk, including a repeated `limit`,
/// falls back to the default instead of failing the request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    /// Pick the `limit` value out of decoded query pairs.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut values = pairs
            .iter()
            .filter(|(key, _)| key == "limit")
            .map(|(_, value)| value);
        let limit = match (values.next(), values.next()) {
            (Some(value), None) => Some(value.clone()),
            _ => None,
        };
        Self { limit }
    }

    /// The requested limit; unparseable input counts as missing.
    pub fn requested(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|s| s.trim().parse().ok())
    }
}
