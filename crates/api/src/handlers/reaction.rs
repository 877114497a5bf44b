//! Handlers for like/dislike reactions on posts and comments.

use agora_core::notification::{NotificationKind, Reaction};
use agora_core::types::DbId;
use agora_db::models::notification::CreateNotification;
use agora_db::repositories::{ReactionChange, ReactionCounts, ReactionRepo, ReactionTarget};
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::comment::find_comment;
use super::post::find_post;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the reaction endpoints. The name is matched
/// case-insensitively.
#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub reaction: String,
}

/// The caller's reaction after the toggle, with the target's totals.
#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    /// `None` when the toggle withdrew the reaction.
    pub reaction: Option<Reaction>,
    pub counts: ReactionCounts,
}

/// POST /api/v1/posts/{id}/reactions
pub async fn react_to_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    Json(input): Json<ReactionRequest>,
) -> AppResult<Json<DataResponse<ReactionResponse>>> {
    let reaction = parse_reaction(&input.reaction)?;
    let post = find_post(&state, post_id).await?;

    let notification = CreateNotification {
        recipient_id: post.user_id,
        actor_id: auth.user_id,
        post_id: post.id,
        comment_id: None,
        kind: NotificationKind::from(reaction),
    };
    apply(&state, &auth, ReactionTarget::Post(post.id), reaction, notification).await
}

/// POST /api/v1/comments/{id}/reactions
pub async fn react_to_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
    Json(input): Json<ReactionRequest>,
) -> AppResult<Json<DataResponse<ReactionResponse>>> {
    let reaction = parse_reaction(&input.reaction)?;
    let comment = find_comment(&state, comment_id).await?;

    let notification = CreateNotification {
        recipient_id: comment.user_id,
        actor_id: auth.user_id,
        post_id: comment.post_id,
        comment_id: Some(comment.id),
        kind: NotificationKind::from(reaction),
    };
    apply(&state, &auth, ReactionTarget::Comment(comment.id), reaction, notification).await
}

fn parse_reaction(raw: &str) -> AppResult<Reaction> {
    Reaction::parse(raw)
        .ok_or_else(|| AppError::validation(format!("Unknown reaction: {:?}", raw.trim())))
}

async fn apply(
    state: &AppState,
    auth: &AuthUser,
    target: ReactionTarget,
    reaction: Reaction,
    notification: CreateNotification,
) -> AppResult<Json<DataResponse<ReactionResponse>>> {
    let change = ReactionRepo::toggle(&state.pool, auth.user_id, target, reaction).await?;
    tracing::debug!(user_id = auth.user_id, ?target, ?change, "Reaction toggled");

    if change.notifies() {
        state.notifier.notify(notification, &auth.username).await;
    }

    let counts = ReactionRepo::counts(&state.pool, target).await?;
    let current = match change {
        ReactionChange::Removed => None,
        ReactionChange::Added | ReactionChange::Switched => Some(reaction),
    };

    Ok(Json(DataResponse {
        data: ReactionResponse {
            reaction: current,
            counts,
        },
    }))
}
