//! Handlers for `/admin` user moderation.

use agora_core::error::CoreError;
use agora_core::roles::Role;
use agora_core::types::DbId;
use agora_db::models::user::UserResponse;
use agora_db::repositories::{SessionRepo, UserRepo};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/ban`.
#[derive(Debug, Deserialize)]
pub struct BanRequest {
    pub banned: bool,
}

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

/// PUT /api/v1/admin/users/{id}/ban
///
/// Only admins may ban or unban. Banning ends the user's session
/// and drops their live connections.
pub async fn set_banned(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<BanRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if user_id == admin.user_id {
        return Err(AppError::BadRequest("You cannot ban yourself".into()));
    }

    let user = UserRepo::set_banned(&state.pool, user_id, input.banned)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    if user.banned {
        let sessions = SessionRepo::delete_for_user(&state.pool, user_id).await?;
        let connections = state.hub.disconnect_user(user_id).await;
        tracing::info!(user_id, by = admin.user_id, sessions, connections, "User banned");
    } else {
        tracing::info!(user_id, by = admin.user_id, "User unbanned");
    }

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// PUT /api/v1/admin/users/{id}/role
pub async fn set_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<RoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let role: Role = input
        .role
        .parse()
        .map_err(|e: agora_core::roles::UnknownRole| AppError::validation(e.to_string()))?;

    let user = UserRepo::set_role(&state.pool, user_id, role)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    tracing::info!(user_id, role = %role, by = admin.user_id, "Role changed");

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
