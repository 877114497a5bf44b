//! Request-scoped identity injection.
//!
//! Runs on every request. A missing, forged or expired session cookie never
//! blocks the request; it only means the request proceeds as a guest.
//! Handlers that need a user reject guests themselves via
//! [`AuthUser`](super::auth::AuthUser).

use agora_core::types::DbId;
use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::auth::cookie::is_session_cookie;
use crate::state::AppState;

/// Who is making the request, as resolved from the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Guest,
    User(DbId),
}

impl Identity {
    pub fn user_id(self) -> Option<DbId> {
        match self {
            Identity::Guest => None,
            Identity::User(id) => Some(id),
        }
    }
}

/// Validate the session cookie, refresh it when it is close to expiry, and
/// store the resulting [`Identity`] in the request extensions.
pub async fn resolve_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let mut refreshed_cookie = None;

    let identity = match state.sessions.validate(req.headers()).await {
        Ok(valid) => {
            if valid.needs_refresh(Utc::now(), state.sessions.refresh_threshold()) {
                match state.sessions.refresh(&valid.session_id).await {
                    Ok(cookie) => refreshed_cookie = Some(cookie),
                    Err(e) => {
                        tracing::warn!(user_id = valid.user_id, error = %e, "Session refresh failed");
                    }
                }
            }
            Identity::User(valid.user_id)
        }
        Err(e) if e.is_guest() => {
            tracing::trace!(reason = %e, "Proceeding as guest");
            Identity::Guest
        }
        Err(e) => {
            tracing::error!(error = %e, "Session validation failed, proceeding as guest");
            Identity::Guest
        }
    };

    req.extensions_mut().insert(identity);
    let mut response = next.run(req).await;

    if let Some(cookie) = refreshed_cookie {
        // A handler that issued or cleared the session cookie takes precedence.
        let handler_set_session = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(is_session_cookie);

        if !handler_set_session {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => tracing::error!(error = %e, "Refreshed cookie is not a valid header"),
            }
        }
    }

    response
}
