pub mod admin;
pub mod auth;
pub mod comment;
pub mod moderator_request;
pub mod notification;
pub mod post;
pub mod reaction;

use agora_core::permissions::{is_allowed, Action};
use agora_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Reject with 403 unless `user` may perform `action` on content owned by
/// `owner_id`.
pub(crate) fn ensure_allowed(user: &AuthUser, owner_id: DbId, action: Action) -> AppResult<()> {
    if is_allowed(&user.actor(), owner_id, action) {
        return Ok(());
    }
    tracing::debug!(
        user_id = user.user_id,
        owner_id,
        action = action.as_str(),
        "Permission denied"
    );
    Err(AppError::forbidden(format!(
        "You are not allowed to {} this content",
        action.as_str()
    )))
}

/// Trim `value` and reject it when empty.
pub(crate) fn required_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
