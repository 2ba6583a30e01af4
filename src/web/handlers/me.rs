//! Current-account handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;

use super::JsonBody;
use crate::auth::SessionState;
use crate::web::dto::{AccountResponse, MeResponse, UpdateProfileRequest};
use crate::web::error::ApiError;
use crate::web::middleware::{removal_cookie, CurrentUser, Session};
use crate::web::state::AppState;

/// GET /api/me - The signed-in account, or `{ok:false}`.
///
/// A cookie naming no live user is cleared.
pub async fn get_me(jar: CookieJar, Session(session): Session) -> (CookieJar, Json<MeResponse>) {
    match session {
        SessionState::Active(user) => (jar, Json(MeResponse::user(&user))),
        SessionState::Stale => (jar.add(removal_cookie()), Json(MeResponse::anonymous())),
        SessionState::Anonymous => (jar, Json(MeResponse::anonymous())),
    }
}

/// PUT /api/me - Change username and avatar URL.
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let user = state
        .auth_service()
        .update_profile(user.id, &req.username, &req.avatar_url)
        .await?;
    Ok(Json(AccountResponse::new(&user)))
}
