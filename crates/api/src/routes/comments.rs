//! Route definitions for the `/comments` resource.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::{comment, reaction};
use crate::state::AppState;

/// Routes mounted at `/comments`.
///
/// ```text
/// PUT    /{id}             -> update_comment
/// DELETE /{id}             -> delete_comment
/// POST   /{id}/reactions   -> react_to_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            put(comment::update_comment).delete(comment::delete_comment),
        )
        .route("/{id}/reactions", post(reaction::react_to_comment))
}
