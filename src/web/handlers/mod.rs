//! API handlers for the Web API.

pub mod auth;
pub mod forum;
pub mod health;
pub mod me;
pub mod thread;
pub mod wall;

pub use auth::*;
pub use forum::*;
pub use health::*;
pub use me::*;
pub use thread::*;
pub use wall::*;

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header, request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;

use super::dto::LimitQuery;
use super::error::ApiError;
use super::state::AppState;

/// JSON body extractor that answers malformed input with `400 invalid JSON`.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                Err(ApiError::bad_request("invalid JSON"))
            }
        }
    }
}

/// Query string extractor that answers malformed input with `400 invalid query string`.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(QueryParams(value)),
            Err(rejection) => {
                tracing::debug!("Rejected query string: {}", rejection.body_text());
                Err(ApiError::bad_request("invalid query string"))
            }
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for LimitQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let QueryParams(pairs) =
            QueryParams::<Vec<(String, String)>>::from_request_parts(parts, state).await?;
        Ok(LimitQuery::from_pairs(&pairs))
    }
}

/// Public origin used in links sent to users.
///
/// The configured base URL wins; otherwise it is derived from the request's
/// `Host` header (and `X-Forwarded-Proto` behind a trusted proxy).
pub fn request_base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.base_url {
        return base.clone();
    }

    let scheme = if state.web.trust_proxy_headers {
        headers
            .get("X-Forwarded-Proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|s| *s == "http" || *s == "https")
            .unwrap_or("http")
    } else {
        "http"
    };
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost");

    format!("{scheme}://{host}")
}

/// Parse a thread id path segment; only positive integers are accepted.
pub fn parse_thread_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::bad_request("invalid thread id")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thread_id() {
        assert_eq!(parse_thread_id("12").unwrap(), 12);
        assert!(parse_thread_id("0").is_err());
        assert!(parse_thread_id("-3").is_err());
        assert!(parse_thread_id("abc").is_err());
        assert!(parse_thread_id("1.5").is_err());
    }
}
