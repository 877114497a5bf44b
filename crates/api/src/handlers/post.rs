//! Handlers for the `/posts` resource.

use agora_core::error::CoreError;
use agora_core::permissions::Action;
use agora_core::types::DbId;
use agora_db::models::post::{Post, PostInput};
use agora_db::repositories::PostRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::{ensure_allowed, required_text};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/posts
pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<PostInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Post>>)> {
    let input = validated(input)?;
    let post = PostRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(post_id = post.id, user_id = auth.user_id, "Post created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: post })))
}

/// PUT /api/v1/posts/{id}
///
/// Owner, moderators and admins may edit.
pub async fn update_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PostInput>,
) -> AppResult<Json<DataResponse<Post>>> {
    let post = find_post(&state, id).await?;
    ensure_allowed(&auth, post.user_id, Action::Edit)?;

    let input = validated(input)?;
    let post = PostRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Post", id }))?;
    Ok(Json(DataResponse { data: post }))
}

/// DELETE /api/v1/posts/{id}
///
/// Owner, moderators and admins may delete.
pub async fn delete_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let post = find_post(&state, id).await?;
    ensure_allowed(&auth, post.user_id, Action::Delete)?;

    PostRepo::delete(&state.pool, id).await?;
    tracing::info!(post_id = id, user_id = auth.user_id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_post(state: &AppState, id: DbId) -> AppResult<Post> {
    PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Post", id }))
}

fn validated(input: PostInput) -> AppResult<PostInput> {
    Ok(PostInput {
        title: required_text("Title", &input.title)?,
        content: required_text("Content", &input.content)?,
    })
}
