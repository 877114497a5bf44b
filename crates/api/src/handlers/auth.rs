//! Handlers for the `/auth` resource (register, login, logout, me).

use std::time::Duration;

use agora_core::roles::Role;
use agora_db::models::user::{CreateUser, UserResponse};
use agora_db::repositories::UserRepo;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::oauth::BANNED_MESSAGE;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Message for every credential failure, so callers cannot tell which
/// emails exist.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Delay before answering a login for an unknown email, roughly matching the
/// cost of a password check.
const UNKNOWN_EMAIL_DELAY: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for `GET /auth/me`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MeResponse {
    Guest,
    Authenticated { user: UserResponse },
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account with role `user` and sign it in.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let username = input.username.trim();
    let email = input.email.trim();

    if username.is_empty() {
        return Err(AppError::validation("Username must not be empty"));
    }
    if !email.contains('@') {
        return Err(AppError::validation("Email address is invalid"));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(AppError::validation)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role: Role::User,
            provider: None,
            provider_id: None,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "User registered");

    let issued = state.sessions.create(user.id).await?;

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, issued.cookie)],
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password and start a session, replacing any
/// session the user already had.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let Some(user) = UserRepo::find_by_email(&state.pool, input.email.trim()).await? else {
        tokio::time::sleep(UNKNOWN_EMAIL_DELAY).await;
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    };

    if user.banned {
        tracing::info!(user_id = user.id, "Login refused for banned account");
        return Err(AppError::forbidden(BANNED_MESSAGE));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Login failed: wrong password");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let issued = state.sessions.create(user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok((
        [(SET_COOKIE, issued.cookie)],
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/v1/auth/logout
///
/// Always answers 204 with a cookie-clearing header, whether or not a
/// session existed.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Err(e) = state.sessions.destroy(&headers).await {
        tracing::error!(error = %e, "Failed to delete session on logout");
    }

    (
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, state.sessions.clearing_cookie())],
    )
}

/// GET /api/v1/auth/me
pub async fn me(MaybeUser(user): MaybeUser) -> Json<DataResponse<MeResponse>> {
    let data = match user {
        Some(user) => MeResponse::Authenticated {
            user: UserResponse::from(&user),
        },
        None => MeResponse::Guest,
    };
    Json(DataResponse { data })
}
