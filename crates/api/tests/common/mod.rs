#![allow(dead_code)]

use std::collections::HashMap;

use agora_core::roles::Role;
use agora_db::models::user::{CreateUser, User};
use agora_db::repositories::UserRepo;
use agora_db::DbPool;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use agora_api::config::ServerConfig;
use agora_api::router::build_app_router;
use agora_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret-key-0123456789";

/// A fully wired application over a throwaway database.
///
/// Keep the value alive for the whole test; dropping it removes the
/// database directory.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub fn pool(&self) -> &DbPool {
        &self.state.pool
    }
}

/// Build a test `ServerConfig` from `overrides` on top of safe defaults.
///
/// The rate limit burst is raised so ordinary tests never trip it; tests
/// of admission control override `RATE_LIMIT_BURST` back down.
pub fn test_config(database_url: &str, overrides: &[(&str, &str)]) -> ServerConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("HOST".to_string(), "127.0.0.1".to_string()),
        ("PORT".to_string(), "0".to_string()),
        ("DATABASE_URL".to_string(), database_url.to_string()),
        ("SESSION_HMAC_SECRET".to_string(), TEST_SECRET.to_string()),
        ("RATE_LIMIT_BURST".to_string(), "100000".to_string()),
    ]);
    for (name, value) in overrides {
        vars.insert(name.to_string(), value.to_string());
    }
    ServerConfig::from_lookup(|name: &str| vars.get(name).cloned()).expect("valid test config")
}

pub async fn test_app() -> TestApp {
    test_app_with(&[]).await
}

/// Build the full application router with all middleware layers, using a
/// fresh migrated database and the given configuration overrides.
pub async fn test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let dir = TempDir::new().expect("create temp dir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = agora_db::create_pool(&url).await.expect("open pool");
    agora_db::run_migrations(&pool).await.expect("run migrations");

    let config = test_config(&url, overrides);
    let state = AppState::new(pool, config).expect("build state");
    let app = build_app_router(state.clone());

    TestApp {
        app,
        state,
        _dir: dir,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user directly, bypassing password hashing.
pub async fn create_user(pool: &DbPool, username: &str, role: Role) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role,
            provider: None,
            provider_id: None,
        },
    )
    .await
    .expect("create user")
}

/// Insert a user and sign them in. Returns the user and a `Cookie` header
/// value carrying their session.
pub async fn signed_in(test: &TestApp, username: &str, role: Role) -> (User, String) {
    let user = create_user(test.pool(), username, role).await;
    let issued = test
        .state
        .sessions
        .create(user.id)
        .await
        .expect("create session");
    (user, cookie_pair(&issued.cookie))
}

/// The `name=value` part of a `Set-Cookie` value.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// The `session_id` cookie set by a response, as a `Cookie` header value.
pub fn session_cookie<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session_id="))
        .map(cookie_pair)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).expect("build request"))
        .await
        .expect("infallible router")
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, cookie, None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, cookie, Some(body)).await
}

pub async fn put_json(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, cookie, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::DELETE, uri, cookie, None).await
}

/// Read the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}
