//! Handlers for moderator promotion requests.
//!
//! Regular users file and track their own request under
//! `/moderator-requests`; admins work the review queue under
//! `/admin/moderator-requests`.

use agora_core::error::CoreError;
use agora_core::promotion::{may_request, promotion_status, PromotionStatus};
use agora_core::types::DbId;
use agora_db::models::moderator_request::{ModeratorRequest, PendingModeratorRequest};
use agora_db::repositories::ModeratorRequestRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

const ALREADY_PENDING: &str = "Request has already been sent and is awaiting review";

/// Response body for `GET /moderator-requests/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: PromotionStatus,
}

/// POST /api/v1/moderator-requests
///
/// Regular users only, one pending request at a time.
pub async fn create_request(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<DataResponse<ModeratorRequest>>)> {
    if !may_request(auth.role) {
        return Err(AppError::conflict("You already have moderator rights"));
    }
    if ModeratorRequestRepo::has_pending(&state.pool, auth.user_id).await? {
        return Err(AppError::conflict(ALREADY_PENDING));
    }

    // A racing duplicate still trips the pending-request unique index,
    // which surfaces as the same 409.
    let request = ModeratorRequestRepo::create(&state.pool, auth.user_id).await?;
    tracing::info!(
        request_id = request.id,
        user_id = auth.user_id,
        "Moderator request filed"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/moderator-requests/status
pub async fn request_status(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<StatusResponse>>> {
    let latest = ModeratorRequestRepo::latest_for_user(&state.pool, auth.user_id)
        .await?
        .map(|request| request.status());
    Ok(Json(DataResponse {
        data: StatusResponse {
            status: promotion_status(auth.role, latest),
        },
    }))
}

/// GET /api/v1/admin/moderator-requests
pub async fn list_pending(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PendingModeratorRequest>>>> {
    let requests = ModeratorRequestRepo::list_pending(&state.pool).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/admin/moderator-requests/{id}/approve
///
/// Grants the author the moderator role.
pub async fn approve_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ModeratorRequest>>> {
    let Some(request) = ModeratorRequestRepo::approve(&state.pool, id, admin.user_id).await? else {
        return Err(not_reviewable(&state, id).await);
    };
    tracing::info!(
        request_id = id,
        user_id = request.user_id,
        by = admin.user_id,
        "Moderator request approved"
    );
    Ok(Json(DataResponse { data: request }))
}

/// POST /api/v1/admin/moderator-requests/{id}/reject
pub async fn reject_request(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ModeratorRequest>>> {
    let Some(request) = ModeratorRequestRepo::reject(&state.pool, id, admin.user_id).await? else {
        return Err(not_reviewable(&state, id).await);
    };
    tracing::info!(
        request_id = id,
        user_id = request.user_id,
        by = admin.user_id,
        "Moderator request rejected"
    );
    Ok(Json(DataResponse { data: request }))
}

/// Explain why request `id` could not be reviewed: it is missing (404) or
/// already decided (409).
async fn not_reviewable(state: &AppState, id: DbId) -> AppError {
    match ModeratorRequestRepo::find_by_id(&state.pool, id).await {
        Ok(Some(request)) => AppError::conflict(format!(
            "Request {id} was already {}",
            request.status()
        )),
        Ok(None) => AppError::Core(CoreError::NotFound {
            entity: "Moderator request",
            id,
        }),
        Err(e) => e.into(),
    }
}
