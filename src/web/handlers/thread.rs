//! Thread and post handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{parse_thread_id, JsonBody};
use crate::forum::ForumService;
use crate::web::dto::{
    ContentRequest, LimitQuery, PostCreatedResponse, PostInfo, PostsResponse, ThreadInfo,
    ThreadResponse,
};
use crate::web::error::ApiError;
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;

/// GET /api/threads/:id - Thread with its forum reference.
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ThreadResponse>, ApiError> {
    let id = parse_thread_id(&id)?;
    let view = ForumService::new(&state.db).get_thread(id).await?;
    Ok(Json(ThreadResponse {
        ok: true,
        thread: ThreadInfo::from(&view),
    }))
}

/// GET /api/threads/:id/posts?limit= - Posts, oldest first.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    query: LimitQuery,
) -> Result<Json<PostsResponse>, ApiError> {
    let id = parse_thread_id(&id)?;
    let posts = ForumService::new(&state.db)
        .list_posts(id, query.requested())
        .await?;
    Ok(Json(PostsResponse {
        ok: true,
        posts: posts.iter().map(PostInfo::from).collect(),
    }))
}

/// POST /api/threads/:id/posts - Reply to a thread.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ContentRequest>,
) -> Result<(StatusCode, Json<PostCreatedResponse>), ApiError> {
    let id = parse_thread_id(&id)?;
    let post = ForumService::new(&state.db)
        .create_post(&user, id, &req.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PostCreatedResponse {
            ok: true,
            post: PostInfo::from(&post),
        }),
    ))
}
