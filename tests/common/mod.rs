//! Test helpers for Web API tests.
//!
//! Builds a router over an in-memory database and offers shortcuts for
//! signing up users.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{header::SET_COOKIE, HeaderName, HeaderValue};
use axum_test::{TestResponse, TestServer};
use axum_extra::extract::cookie::Cookie;
use serde_json::json;

use naranjo::{
    create_router, AppState, Config, Database, FixedWindowLimiter, MemoryMailer, RateLimiter, Role,
    UserRepository,
};

/// Password used for every test account.
pub const PASSWORD: &str = "secret123";

/// A running app plus handles to its internals.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub mailer: Arc<MemoryMailer>,
}

/// Configuration used by most tests: generous registration limit.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.session_secret = "test-secret-key-for-testing-only".to_string();
    config.auth.register_rate_limit = 100;
    config.server.base_url = Some("http://naranjo.test".to_string());
    config
}

/// Create a test app with the default test configuration.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

/// Create a test app with a custom configuration.
pub async fn spawn_app_with(config: Config) -> TestApp {
    spawn_app_with_limiter(config, Arc::new(FixedWindowLimiter::new())).await
}

/// Create a test app whose rate limiter is shared with the caller.
pub async fn spawn_app_with_limiter(config: Config, limiter: Arc<dyn RateLimiter>) -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let mailer = Arc::new(MemoryMailer::new());
    let state = Arc::new(
        AppState::new(db.clone(), &config, mailer.clone()).with_limiter(limiter),
    );
    let server = TestServer::new(create_router(state)).expect("Failed to create test server");

    TestApp { server, db, mailer }
}

impl TestApp {
    /// POST /api/auth/register.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.server
            .post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password
            }))
            .await
    }

    /// POST /api/auth/login.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.server
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .await
    }

    /// Register `username` (email `<username>@example.com`) and return its session cookie.
    pub async fn signup(&self, username: &str) -> Cookie<'static> {
        let response = self
            .register(username, &format!("{username}@example.com"), PASSWORD)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.cookie("uid")
    }

    /// Register `username` and grant it the admin role.
    pub async fn signup_admin(&self, username: &str) -> Cookie<'static> {
        let cookie = self.signup(username).await;
        let repo = UserRepository::new(self.db.pool());
        let user = repo
            .get_by_username(username)
            .await
            .unwrap()
            .expect("user just registered");
        repo.set_role(user.id, Role::Admin).await.unwrap();
        cookie
    }

    /// Create a forum as `admin`, returning its slug.
    pub async fn create_forum(&self, admin: &Cookie<'static>, title: &str) -> String {
        let response = self
            .server
            .post("/api/forums")
            .add_cookie(admin.clone())
            .json(&json!({ "title": title, "description": "" }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<serde_json::Value>()["forum"]["slug"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Open a thread in `slug`, returning its id.
    pub async fn create_thread(&self, user: &Cookie<'static>, slug: &str, title: &str) -> i64 {
        let response = self
            .server
            .post(&format!("/api/forums/{slug}/threads"))
            .add_cookie(user.clone())
            .json(&json!({ "title": title, "content": "first post" }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<serde_json::Value>()["thread"]["id"]
            .as_i64()
            .unwrap()
    }
}

/// `X-Forwarded-For` header naming `ip`.
pub fn forwarded_for(ip: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_str(ip).unwrap(),
    )
}

/// Whether the response expires the session cookie.
pub fn clears_session(response: &TestResponse) -> bool {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with("uid=;") && v.contains("Max-Age=0"))
}
