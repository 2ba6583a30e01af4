//! Forum handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::JsonBody;
use crate::forum::ForumService;
use crate::web::dto::{
    CreateForumRequest, CreateThreadRequest, ForumCreatedResponse, ForumInfo, ForumRefInfo,
    ForumsResponse, PostInfo, ThreadCreatedResponse, ThreadInfo, ThreadsResponse,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AdminUser, CurrentUser};
use crate::web::state::AppState;

/// GET /api/forums - All forums, newest first.
pub async fn list_forums(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ForumsResponse>, ApiError> {
    let forums = ForumService::new(&state.db).list_forums().await?;
    Ok(Json(ForumsResponse {
        ok: true,
        forums: forums.iter().map(ForumInfo::from).collect(),
    }))
}

/// POST /api/forums - Create a forum (admin only).
pub async fn create_forum(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    JsonBody(req): JsonBody<CreateForumRequest>,
) -> Result<(StatusCode, Json<ForumCreatedResponse>), ApiError> {
    let forum = ForumService::new(&state.db)
        .create_forum(&admin, &req.title, &req.description)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ForumCreatedResponse {
            ok: true,
            forum: ForumInfo::from(&forum),
        }),
    ))
}

/// GET /api/forums/:slug/threads - Threads by recent activity.
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ThreadsResponse>, ApiError> {
    let (forum, threads) = ForumService::new(&state.db).list_threads(&slug).await?;
    Ok(Json(ThreadsResponse {
        ok: true,
        forum: ForumRefInfo::from(&forum),
        threads: threads.iter().map(ThreadInfo::from).collect(),
    }))
}

/// POST /api/forums/:slug/threads - Open a thread with its first post.
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
    JsonBody(req): JsonBody<CreateThreadRequest>,
) -> Result<(StatusCode, Json<ThreadCreatedResponse>), ApiError> {
    let (thread, first_post) = ForumService::new(&state.db)
        .create_thread(&user, &slug, &req.title, &req.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ThreadCreatedResponse {
            ok: true,
            thread: ThreadInfo::from(&thread),
            first_post: PostInfo::from(&first_post),
        }),
    ))
}
