//! Rate limiting middleware.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::rate_limit::RateLimitResult;
use crate::web::error::ApiError;
use crate::web::state::AppState;

/// Extract the client address from a request.
///
/// Proxy headers are only honored when `trust_proxy_headers` is set;
/// otherwise the socket peer address is used.
pub fn get_client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    if trust_proxy_headers {
        // First hop in the chain is the original client
        if let Some(ip) = headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return ip.to_string();
        }

        if let Some(real_ip) = headers
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return real_ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Client address for a request, per the state's proxy setting.
pub fn client_ip_of(req: &Request<Body>, state: &AppState) -> String {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    get_client_ip(req.headers(), peer, state.web.trust_proxy_headers)
}

/// Whole seconds for `Retry-After`, rounded up and never zero.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

/// Limit registration attempts per client address.
pub async fn register_rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip_of(&req, &state);
    let key = format!("register:{ip}");

    match state.limiter.check(&key, state.register_limit()) {
        RateLimitResult::Allowed => next.run(req).await,
        RateLimitResult::Denied { retry_after } => {
            let secs = retry_after_secs(retry_after);
            tracing::warn!(ip = %ip, retry_after_secs = secs, "Registration rate limit exceeded");
            ApiError::too_many_requests(secs).into_response()
        }
    }
}
