//! Handlers for comments and replies.

use agora_core::error::CoreError;
use agora_core::notification::NotificationKind;
use agora_core::permissions::Action;
use agora_core::types::DbId;
use agora_db::models::comment::{Comment, CreateComment};
use agora_db::models::notification::CreateNotification;
use agora_db::repositories::CommentRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::post::find_post;
use super::{ensure_allowed, required_text};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /comments/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateComment {
    pub content: String,
}

/// POST /api/v1/posts/{id}/comments
///
/// A top-level comment notifies the post author; a reply notifies the
/// author of the parent comment.
pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    let post = find_post(&state, post_id).await?;
    let content = required_text("Content", &input.content)?;

    let parent = match input.parent_comment_id {
        Some(parent_id) => {
            let parent = find_comment(&state, parent_id).await?;
            if parent.post_id != post.id {
                return Err(AppError::BadRequest(
                    "Parent comment belongs to a different post".into(),
                ));
            }
            Some(parent)
        }
        None => None,
    };

    let comment = CommentRepo::create(
        &state.pool,
        post.id,
        auth.user_id,
        parent.as_ref().map(|p| p.id),
        &content,
    )
    .await?;
    tracing::info!(comment_id = comment.id, post_id, user_id = auth.user_id, "Comment created");

    let (recipient_id, kind) = match &parent {
        Some(parent) => (parent.user_id, NotificationKind::Reply),
        None => (post.user_id, NotificationKind::Comment),
    };
    state
        .notifier
        .notify(
            CreateNotification {
                recipient_id,
                actor_id: auth.user_id,
                post_id: post.id,
                comment_id: Some(comment.id),
                kind,
            },
            &auth.username,
        )
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// PUT /api/v1/comments/{id}
pub async fn update_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateComment>,
) -> AppResult<Json<DataResponse<Comment>>> {
    let comment = find_comment(&state, id).await?;
    ensure_allowed(&auth, comment.user_id, Action::Edit)?;

    let content = required_text("Content", &input.content)?;
    let comment = CommentRepo::update(&state.pool, id, &content)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Comment", id }))?;
    Ok(Json(DataResponse { data: comment }))
}

/// DELETE /api/v1/comments/{id}
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let comment = find_comment(&state, id).await?;
    ensure_allowed(&auth, comment.user_id, Action::Delete)?;

    CommentRepo::delete(&state.pool, id).await?;
    tracing::info!(comment_id = id, user_id = auth.user_id, "Comment deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_comment(state: &AppState, id: DbId) -> AppResult<Comment> {
    CommentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Comment", id }))
}
