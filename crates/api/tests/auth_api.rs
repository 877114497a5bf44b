//! HTTP-level integration tests for registration, login, logout and the
//! session cookie lifecycle.

mod common;

use agora_core::roles::Role;
use agora_db::repositories::{SessionRepo, UserRepo};
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use chrono::Utc;
use common::{body_json, get, post_json, session_cookie, signed_in, test_app};
use serde_json::json;

const PASSWORD: &str = "correct-horse-battery";

async fn register(app: &axum::Router, username: &str) -> axum::http::Response<axum::body::Body> {
    post_json(
        app,
        "/api/v1/auth/register",
        None,
        json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": PASSWORD,
        }),
    )
    .await
}

async fn login(app: &axum::Router, email: &str, password: &str) -> axum::http::Response<axum::body::Body> {
    post_json(
        app,
        "/api/v1/auth/login",
        None,
        json!({ "email": email, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_signs_the_user_in() {
    let test = test_app().await;

    let response = register(&test.app, "alice").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response).expect("session cookie set");

    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "alice");
    assert_eq!(json["data"]["role"], "user");
    assert!(json["data"].get("password_hash").is_none());

    let me = body_json(get(&test.app, "/api/v1/auth/me", Some(&cookie)).await).await;
    assert_eq!(me["data"]["status"], "authenticated");
    assert_eq!(me["data"]["user"]["username"], "alice");
}

#[tokio::test]
async fn register_rejects_taken_username() {
    let test = test_app().await;
    assert_eq!(register(&test.app, "alice").await.status(), StatusCode::CREATED);

    let response = post_json(
        &test.app,
        "/api/v1/auth/register",
        None,
        json!({ "username": "alice", "email": "other@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "Username is already taken");
}

#[tokio::test]
async fn register_rejects_short_password() {
    let test = test_app().await;
    let response = post_json(
        &test.app,
        "/api/v1/auth/register",
        None,
        json!({ "username": "bob", "email": "bob@example.com", "password": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(session_cookie(&response).is_none());
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_failures_share_one_message() {
    let test = test_app().await;
    register(&test.app, "alice").await;

    let wrong_password = login(&test.app, "alice@example.com", "not-the-password").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(wrong_password).await;

    let unknown = login(&test.app, "nobody@example.com", PASSWORD).await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown = body_json(unknown).await;

    assert_eq!(wrong_password["error"], "Invalid email or password");
    assert_eq!(wrong_password, unknown);
}

#[tokio::test]
async fn login_trims_email() {
    let test = test_app().await;
    register(&test.app, "alice").await;

    let response = login(&test.app, "  alice@example.com ", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn banned_user_cannot_log_in() {
    let test = test_app().await;
    let registered = body_json(register(&test.app, "mallory").await).await;
    let id = registered["data"]["id"].as_i64().unwrap();
    UserRepo::set_banned(test.pool(), id, true).await.unwrap();

    let response = login(&test.app, "mallory@example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "Your account has been blocked");
}

#[tokio::test]
async fn second_login_invalidates_first_session() {
    let test = test_app().await;
    let first = session_cookie(&register(&test.app, "alice").await).unwrap();

    let second = login(&test.app, "alice@example.com", PASSWORD).await;
    let second = session_cookie(&second).unwrap();
    assert_ne!(first, second);

    let me = body_json(get(&test.app, "/api/v1/auth/me", Some(&first)).await).await;
    assert_eq!(me["data"]["status"], "guest");
    let me = body_json(get(&test.app, "/api/v1/auth/me", Some(&second)).await).await;
    assert_eq!(me["data"]["status"], "authenticated");
}

// ---------------------------------------------------------------------------
// Logout and guests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn logout_clears_cookie_and_session() {
    let test = test_app().await;
    let (user, cookie) = signed_in(&test, "alice", Role::User).await;

    let response = post_json(&test.app, "/api/v1/auth/logout", Some(&cookie), json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cleared = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cleared.starts_with("session_id=;"));
    assert!(cleared.contains("Max-Age=0"));

    assert_eq!(SessionRepo::count_for_user(test.pool(), user.id).await.unwrap(), 0);
    let me = body_json(get(&test.app, "/api/v1/auth/me", Some(&cookie)).await).await;
    assert_eq!(me["data"]["status"], "guest");
}

#[tokio::test]
async fn logout_without_session_still_succeeds() {
    let test = test_app().await;
    let response = post_json(&test.app, "/api/v1/auth/logout", None, json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().get(SET_COOKIE).is_some());
}

#[tokio::test]
async fn tampered_cookie_is_a_guest() {
    let test = test_app().await;
    let (_, cookie) = signed_in(&test, "alice", Role::User).await;
    let tampered = format!("{cookie}x");

    let response = get(&test.app, "/api/v1/auth/me", Some(&tampered)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "guest");

    let response = get(&test.app, "/api/v1/notifications", Some(&tampered)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Expiry and refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expired_session_is_deleted_on_use() {
    let test = test_app().await;
    let user = common::create_user(test.pool(), "alice", Role::User).await;
    let issued = test.state.sessions.create(user.id).await.unwrap();
    SessionRepo::extend(test.pool(), &issued.session.id, Utc::now() - chrono::Duration::minutes(1))
        .await
        .unwrap();

    let cookie = common::cookie_pair(&issued.cookie);
    let me = body_json(get(&test.app, "/api/v1/auth/me", Some(&cookie)).await).await;
    assert_eq!(me["data"]["status"], "guest");
    assert!(SessionRepo::find_by_id(test.pool(), &issued.session.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn session_near_expiry_is_refreshed() {
    let test = test_app().await;
    let user = common::create_user(test.pool(), "alice", Role::User).await;
    let issued = test.state.sessions.create(user.id).await.unwrap();
    let soon = Utc::now() + chrono::Duration::minutes(30);
    SessionRepo::extend(test.pool(), &issued.session.id, soon).await.unwrap();

    let cookie = common::cookie_pair(&issued.cookie);
    let response = get(&test.app, "/api/v1/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(session_cookie(&response).as_deref(), Some(cookie.as_str()));

    let session = SessionRepo::find_by_id(test.pool(), &issued.session.id)
        .await
        .unwrap()
        .unwrap();
    assert!(session.expires_at > Utc::now() + chrono::Duration::hours(23));
}

#[tokio::test]
async fn fresh_session_is_not_refreshed() {
    let test = test_app().await;
    let (_, cookie) = signed_in(&test, "alice", Role::User).await;

    let response = get(&test.app, "/api/v1/auth/me", Some(&cookie)).await;
    assert!(session_cookie(&response).is_none());
}
