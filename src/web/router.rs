//! Router configuration for Web API.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::error::ApiError;
use super::handlers::{
    create_forum, create_post, create_thread, get_me, get_thread, health, list_forums,
    list_messages, list_posts, list_threads, login, logout, post_message, register,
    resend_verification, update_me, verify_email,
};
use super::middleware::{create_cors_layer, register_rate_limit, security_headers};
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Registration is the only rate-limited route
    let register_routes = Router::new()
        .route("/register", post(register))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            register_rate_limit,
        ));

    let auth_routes = Router::new()
        .merge(register_routes)
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/verify", get(verify_email))
        .route("/resend-verification", post(resend_verification));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .route("/me", get(get_me).put(update_me))
        .route("/health", get(health))
        .route("/messages", get(list_messages).post(post_message))
        .route("/forums", get(list_forums).post(create_forum))
        .route(
            "/forums/:slug/threads",
            get(list_threads).post(create_thread),
        )
        .route("/threads/:id", get(get_thread))
        .route("/threads/:id/posts", get(list_posts).post(create_post))
        .fallback(not_found);

    let mut router = Router::new().nest("/api", api_routes);

    router = if state.web.serve_static {
        tracing::info!("Serving static files from {}", state.web.static_path);
        router.fallback_service(ServeDir::new(&state.web.static_path))
    } else {
        router.fallback(not_found)
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(create_cors_layer(&state.web.cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(state)
}

/// JSON 404 for unknown routes.
async fn not_found() -> ApiError {
    ApiError::not_found("route not found")
}
