//! Route definitions for `/moderator-requests`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::moderator_request;
use crate::state::AppState;

/// Routes mounted at `/moderator-requests`.
///
/// ```text
/// POST   /          -> create_request
/// GET    /status    -> request_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(moderator_request::create_request))
        .route("/status", get(moderator_request::request_status))
}
