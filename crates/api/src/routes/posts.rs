//! Route definitions for the `/posts` resource.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::{comment, post as posts, reaction};
use crate::state::AppState;

/// Routes mounted at `/posts`.
///
/// ```text
/// POST   /                 -> create_post
/// PUT    /{id}             -> update_post
/// DELETE /{id}             -> delete_post
/// POST   /{id}/comments    -> create_comment
/// POST   /{id}/reactions   -> react_to_post
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(posts::create_post))
        .route("/{id}", put(posts::update_post).delete(posts::delete_post))
        .route("/{id}/comments", post(comment::create_comment))
        .route("/{id}/reactions", post(reaction::react_to_post))
}
