//! Session cookie handling and authentication extractors.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::{require_admin, require_session, resolve, SessionState, SESSION_COOKIE};
use crate::db::User;
use crate::web::error::ApiError;
use crate::web::state::AppState;

/// Build the session cookie for a freshly issued token.
pub fn session_cookie(token: String, max_age: std::time::Duration, secure: bool) -> Cookie<'static> {
    let max_age = time::Duration::seconds(i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX));
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

/// A cookie that expires the session cookie.
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}

fn session_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

/// The resolved session, whatever its outcome.
#[derive(Debug, Clone)]
pub struct Session(pub SessionState);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }

        let token = session_token(parts);
        let session = Session(resolve(&state.db, &state.session_keys, token.as_deref()).await?);
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

/// Extractor for an authenticated user.
///
/// Rejects with 401; a stale cookie is cleared in the same response.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Session(session) = Session::from_request_parts(parts, state).await?;
        match require_session(&session) {
            Ok(user) => Ok(CurrentUser(user.clone())),
            Err(e) => {
                let err = ApiError::unauthorized(e.to_string());
                Err(if session.is_stale() {
                    err.clearing_session()
                } else {
                    err
                })
            }
        }
    }
}

/// Extractor for an authenticated administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if let Err(e) = require_admin(&user, state.admin_email()) {
            tracing::warn!(user_id = user.id, "Admin access denied");
            return Err(ApiError::forbidden(e.to_string()));
        }
        Ok(AdminUser(user))
    }
}
