pub mod admin;
pub mod auth;
pub mod comments;
pub mod health;
pub mod moderator_requests;
pub mod notification;
pub mod posts;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket (requires auth)
///
/// /auth/register                       register (public)
/// /auth/login                          login (public)
/// /auth/logout                         logout (public, idempotent)
/// /auth/me                             current identity (public)
///
/// /posts                               create
/// /posts/{id}                          update, delete
/// /posts/{id}/comments                 comment or reply
/// /posts/{id}/reactions                toggle reaction
///
/// /comments/{id}                       update, delete
/// /comments/{id}/reactions             toggle reaction
///
/// /notifications                       list
/// /notifications/unread-count          unread total
/// /notifications/read-all              mark all read
/// /notifications/{id}/read             mark one read
///
/// /moderator-requests                  request promotion (regular users)
/// /moderator-requests/status           own promotion status
///
/// /admin/users/{id}/ban                ban / unban (admin only)
/// /admin/users/{id}/role               change role (admin only)
/// /admin/moderator-requests            pending promotion requests (admin only)
/// /admin/moderator-requests/{id}/...   approve / reject (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/notifications", notification::router())
        .nest("/moderator-requests", moderator_requests::router())
        .nest("/admin", admin::router())
}
