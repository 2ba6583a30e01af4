//! Authentication handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::CookieJar;

use super::{request_base_url, JsonBody, QueryParams};
use crate::auth::RegistrationRequest;
use crate::web::dto::{
    AccountResponse, LoginRequest, NoticeResponse, OkResponse, RegisterRequest, VerifyQuery,
};
use crate::web::error::ApiError;
use crate::web::middleware::{get_client_ip, removal_cookie, session_cookie, CurrentUser};
use crate::web::state::AppState;

fn issue_session(state: &AppState, jar: CookieJar, user_id: i64) -> Result<CookieJar, ApiError> {
    let token = state.session_keys.issue(user_id)?;
    Ok(jar.add(session_cookie(
        token,
        state.session_keys.ttl(),
        state.auth.secure_cookies,
    )))
}

/// POST /api/auth/register - Create an account and sign in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AccountResponse>), ApiError> {
    let base_url = request_base_url(&state, &headers);
    let request = RegistrationRequest::new(req.username, req.email, req.password);
    let user = state.auth_service().register(&request, &base_url).await?;

    let jar = issue_session(&state, jar, user.id)?;
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AccountResponse::new(&user).with_message("registration successful")),
    ))
}

/// POST /api/auth/login - Sign in with email and password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    jar: CookieJar,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<AccountResponse>), ApiError> {
    let user = state.auth_service().login(&req.email, &req.password).await?;

    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let ip = get_client_ip(&headers, peer, state.web.trust_proxy_headers);
    state.limiter.reset(&format!("login:{ip}"));

    let jar = issue_session(&state, jar, user.id)?;
    Ok((jar, Json(AccountResponse::new(&user))))
}

/// GET /api/auth/verify?token= - Confirm an email address.
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<VerifyQuery>,
) -> Result<Json<NoticeResponse>, ApiError> {
    state.auth_service().verify_email(&query.token).await?;
    Ok(Json(NoticeResponse::new("email verified")))
}

/// POST /api/auth/resend-verification - Send a new verification link.
pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
) -> Result<Json<NoticeResponse>, ApiError> {
    let base_url = request_base_url(&state, &headers);
    state
        .auth_service()
        .resend_verification(&user, &base_url)
        .await?;
    Ok(Json(NoticeResponse::new("verification email sent")))
}

/// POST /api/auth/logout - Clear the session cookie. Always succeeds.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<OkResponse>) {
    (jar.add(removal_cookie()), Json(OkResponse::new()))
}
