//! Web API Authentication Tests
//!
//! Integration tests for registration, login, sessions, verification and
//! the registration rate limit.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use naranjo::mailer::token_from_link;
use naranjo::{FixedWindowLimiter, RateLimiter, UserRepository};
use serde_json::{json, Value};

use common::{
    clears_session, forwarded_for, spawn_app, spawn_app_with, spawn_app_with_limiter, test_config,
    PASSWORD,
};

// ============================================================================
// Registration Tests
// ============================================================================

#[tokio::test]
async fn test_register_success() {
    let app = spawn_app().await;

    let response = app
        .register("testuser", "  TestUser@Example.com ", PASSWORD)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["user"]["username"], "testuser");
    assert_eq!(body["user"]["email"], "testuser@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["emailVerified"], true);
    assert_eq!(body["user"]["avatarUrl"], "");
    assert!(body["message"].is_string());
    assert!(body["user"].get("passwordHash").is_none());

    let cookie = response.cookie("uid");
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
}

#[tokio::test]
async fn test_register_sends_verification_link() {
    let app = spawn_app().await;
    app.register("mailme", "mailme@example.com", PASSWORD)
        .await
        .assert_status(StatusCode::CREATED);

    let mail = app.mailer.last().expect("verification mail");
    assert_eq!(mail.to, "mailme@example.com");
    assert!(mail.body.contains("http://naranjo.test/api/auth/verify?token="));
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = spawn_app().await;

    let cases = [
        ("ab", "a@example.com", PASSWORD),
        (" spaced", "a@example.com", PASSWORD),
        ("bad name!", "a@example.com", PASSWORD),
        ("gooduser", "not-an-email", PASSWORD),
        ("gooduser", "", PASSWORD),
        ("gooduser", "a@example.com", "12345"),
    ];
    for (username, email, password) in cases {
        let response = app.register(username, email, password).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
        assert!(body["message"].is_string(), "{username}/{email}");
    }

    let count = UserRepository::new(app.db.pool()).count().await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_register_long_password() {
    let app = spawn_app().await;
    let password = "p".repeat(129);

    let response = app
        .register("longpw", "longpw@example.com", &password)
        .await;
    response.assert_status(StatusCode::CREATED);

    app.login("longpw@example.com", &password)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_register_duplicates_conflict() {
    let app = spawn_app().await;
    app.signup("alice").await;

    let response = app.register("ALICE", "other@example.com", PASSWORD).await;
    response.assert_status(StatusCode::CONFLICT);

    let response = app.register("alice2", "Alice@Example.com", PASSWORD).await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["ok"], false);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/auth/register")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({"ok": false, "message": "invalid JSON"})
    );
}

#[tokio::test]
async fn test_non_string_fields_fail_validation() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({"username": 123, "email": ["x"], "password": null}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "username is required");
}

// ============================================================================
// Rate Limit Tests
// ============================================================================

#[tokio::test]
async fn test_register_rate_limit() {
    let mut config = test_config();
    config.auth.register_rate_limit = 5;
    config.auth.register_rate_window_secs = 1;
    config.web.trust_proxy_headers = true;
    let app = spawn_app_with(config).await;

    let register_from = |ip: &'static str, n: usize| {
        let (name, value) = forwarded_for(ip);
        app.server
            .post("/api/auth/register")
            .add_header(name, value)
            .json(&json!({
                "username": format!("user{n}"),
                "email": format!("user{n}@example.com"),
                "password": PASSWORD
            }))
    };

    // Rejected attempts count too, and skip password hashing
    let (name, value) = forwarded_for("203.0.113.1");
    for _ in 0..5 {
        app.server
            .post("/api/auth/register")
            .add_header(name.clone(), value.clone())
            .json(&json!({"username": "x", "email": "bad", "password": ""}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    let denied = register_from("203.0.113.1", 5).await;
    denied.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(denied.json::<Value>()["ok"], false);
    let retry_after: u64 = denied
        .headers()
        .get("retry-after")
        .expect("Retry-After header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);

    // Other clients are unaffected
    register_from("198.51.100.9", 6)
        .await
        .assert_status(StatusCode::CREATED);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    register_from("203.0.113.1", 7)
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_invalid_attempts_count_towards_limit() {
    let mut config = test_config();
    config.auth.register_rate_limit = 2;
    let app = spawn_app_with(config).await;

    app.register("x", "bad", "1").await.assert_status(StatusCode::BAD_REQUEST);
    app.register("y", "bad", "1").await.assert_status(StatusCode::BAD_REQUEST);
    app.register("validname", "valid@example.com", PASSWORD)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_injected_limiter_is_shared() {
    let mut config = test_config();
    config.auth.register_rate_limit = 1;
    let limiter = Arc::new(FixedWindowLimiter::new());
    let app = spawn_app_with_limiter(config, limiter.clone()).await;

    app.register("x", "bad", "1").await.assert_status(StatusCode::BAD_REQUEST);
    app.register("y", "bad", "1")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    // Without connection info every client is keyed as "unknown"
    limiter.reset("register:unknown");
    app.register("allowed", "allowed@example.com", PASSWORD)
        .await
        .assert_status(StatusCode::CREATED);
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let app = spawn_app().await;
    app.signup("bob").await;

    let response = app.login("  BOB@example.com ", PASSWORD).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["user"]["username"], "bob");
    assert!(!response.cookie("uid").value().is_empty());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = spawn_app().await;
    app.signup("carol").await;

    let wrong_password = app.login("carol@example.com", "wrong-password").await;
    let unknown_email = app.login("nobody@example.com", PASSWORD).await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.json::<Value>(),
        unknown_email.json::<Value>()
    );
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = spawn_app().await;
    app.login("", PASSWORD).await.assert_status(StatusCode::BAD_REQUEST);
    app.login("someone@example.com", "")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Session Tests
// ============================================================================

#[tokio::test]
async fn test_me_without_cookie() {
    let app = spawn_app().await;

    let response = app.server.get("/api/me").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"ok": false}));
}

#[tokio::test]
async fn test_me_with_session() {
    let app = spawn_app().await;
    let cookie = app.signup("dave").await;

    let response = app.server.get("/api/me").add_cookie(cookie).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["user"]["username"], "dave");
    assert_eq!(body["user"]["email"], "dave@example.com");
}

#[tokio::test]
async fn test_me_for_deleted_user_clears_cookie() {
    let app = spawn_app().await;
    let cookie = app.signup("ghost").await;

    let repo = UserRepository::new(app.db.pool());
    let user = repo.get_by_username("ghost").await.unwrap().unwrap();
    assert!(repo.delete(user.id).await.unwrap());

    let response = app.server.get("/api/me").add_cookie(cookie).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"ok": false}));
    assert!(clears_session(&response));
}

#[tokio::test]
async fn test_forged_cookie_is_stale() {
    let app = spawn_app().await;
    app.signup("victim").await;

    // A bare user id is not a valid session
    let forged = axum_extra::extract::cookie::Cookie::new("uid", "1");
    let response = app.server.get("/api/me").add_cookie(forged.clone()).await;
    assert_eq!(response.json::<Value>(), json!({"ok": false}));
    assert!(clears_session(&response));

    let response = app
        .server
        .post("/api/messages")
        .add_cookie(forged)
        .json(&json!({"content": "hi"}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "invalid session");
    assert!(clears_session(&response));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = spawn_app().await;

    let response = app.server.post("/api/auth/logout").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"ok": true}));
    assert!(clears_session(&response));
}

// ============================================================================
// Profile Tests
// ============================================================================

#[tokio::test]
async fn test_update_profile() {
    let app = spawn_app().await;
    let cookie = app.signup("erin").await;

    let response = app
        .server
        .put("/api/me")
        .add_cookie(cookie.clone())
        .json(&json!({"username": "erin2", "avatarUrl": "  https://img.test/e.png "}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user"]["username"], "erin2");
    assert_eq!(body["user"]["avatarUrl"], "https://img.test/e.png");

    // Keeping your own name is not a conflict
    app.server
        .put("/api/me")
        .add_cookie(cookie)
        .json(&json!({"username": "erin2", "avatarUrl": ""}))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_update_profile_rules() {
    let app = spawn_app().await;
    app.signup("frank").await;
    let cookie = app.signup("grace").await;

    app.server
        .put("/api/me")
        .add_cookie(cookie.clone())
        .json(&json!({"username": "FRANK", "avatarUrl": ""}))
        .await
        .assert_status(StatusCode::CONFLICT);

    app.server
        .put("/api/me")
        .add_cookie(cookie.clone())
        .json(&json!({"username": "grace", "avatarUrl": "x".repeat(501)}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .put("/api/me")
        .json(&json!({"username": "grace", "avatarUrl": ""}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Email Verification Tests
// ============================================================================

#[tokio::test]
async fn test_verify_email_token() {
    let app = spawn_app().await;
    app.signup("henry").await;
    let token = token_from_link(&app.mailer.last().unwrap().body).expect("token in mail");

    let response = app
        .server
        .get("/api/auth/verify")
        .add_query_param("token", &token)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["ok"], true);

    // Single use
    app.server
        .get("/api/auth/verify")
        .add_query_param("token", &token)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_email_bad_tokens() {
    let app = spawn_app().await;

    app.server
        .get("/api/auth/verify")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.server
        .get("/api/auth/verify")
        .add_query_param("token", "deadbeef")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // A malformed query string still gets the JSON error shape
    let response = app.server.get("/api/auth/verify?token=a&token=b").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({"ok": false, "message": "invalid query string"})
    );
}

#[tokio::test]
async fn test_resend_verification() {
    let app = spawn_app().await;

    app.server
        .post("/api/auth/resend-verification")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // Accounts start verified, so there is nothing to resend
    let cookie = app.signup("iris").await;
    let response = app
        .server
        .post("/api/auth/resend-verification")
        .add_cookie(cookie.clone())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "email already verified");

    sqlx::query("UPDATE users SET email_verified = 0 WHERE username = 'iris'")
        .execute(app.db.pool())
        .await
        .unwrap();
    let sent_before = app.mailer.sent().len();

    app.server
        .post("/api/auth/resend-verification")
        .add_cookie(cookie)
        .await
        .assert_status_ok();
    assert_eq!(app.mailer.sent().len(), sent_before + 1);
}

// ============================================================================
// Misc
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let response = app.server.get("/api/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["status"], "up");
    assert!(body["time"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = spawn_app().await;

    let response = app.server.get("/api/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["ok"], false);

    app.server
        .get("/elsewhere")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = spawn_app().await;

    let response = app.server.get("/api/health").await;
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}
