//! Route definitions for `/admin`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin, moderator_request};
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler requires the admin role.
///
/// ```text
/// PUT    /users/{id}/ban                    -> set_banned
/// PUT    /users/{id}/role                   -> set_role
/// GET    /moderator-requests                -> list_pending
/// POST   /moderator-requests/{id}/approve   -> approve_request
/// POST   /moderator-requests/{id}/reject    -> reject_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}/ban", put(admin::set_banned))
        .route("/users/{id}/role", put(admin::set_role))
        .route("/moderator-requests", get(moderator_request::list_pending))
        .route(
            "/moderator-requests/{id}/approve",
            post(moderator_request::approve_request),
        )
        .route(
            "/moderator-requests/{id}/reject",
            post(moderator_request::reject_request),
        )
}
