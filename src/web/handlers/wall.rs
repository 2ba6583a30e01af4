//! Wall message handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::JsonBody;
use crate::wall::WallService;
use crate::web::dto::{
    ContentRequest, LimitQuery, MessageCreatedResponse, MessageInfo, MessagesResponse,
};
use crate::web::error::ApiError;
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;

/// GET /api/messages?limit= - Newest messages first.
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    query: LimitQuery,
) -> Result<Json<MessagesResponse>, ApiError> {
    let messages = WallService::new(&state.db)
        .list_messages(query.requested())
        .await?;

    Ok(Json(MessagesResponse {
        ok: true,
        messages: messages.iter().map(MessageInfo::from).collect(),
    }))
}

/// POST /api/messages - Post to the wall.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    JsonBody(req): JsonBody<ContentRequest>,
) -> Result<(StatusCode, Json<MessageCreatedResponse>), ApiError> {
    let message = WallService::new(&state.db)
        .post_message(&user, &req.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageCreatedResponse {
            ok: true,
            message: MessageInfo::from(&message),
        }),
    ))
}
