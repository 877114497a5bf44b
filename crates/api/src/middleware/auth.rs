//! Session-based authentication extractors for Axum handlers.

use agora_core::permissions::Actor;
use agora_core::roles::Role;
use agora_core::types::DbId;
use agora_db::models::user::User;
use agora_db::repositories::UserRepo;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::session::Identity;
use crate::auth::oauth::BANNED_MESSAGE;
use crate::error::AppError;
use crate::state::AppState;

/// The signed-in user behind the request's session cookie.
///
/// Rejects guests with 401 and banned accounts with 403:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    /// The user as seen by the permission evaluator.
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        let user = user.ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        if user.banned {
            return Err(AppError::forbidden(BANNED_MESSAGE));
        }

        Ok(AuthUser {
            user_id: user.id,
            role: user.role(),
            username: user.username,
        })
    }
}

/// The full user row for the request's identity, or `None` for guests.
///
/// Never rejects for missing identity. A session pointing at a deleted user
/// is treated as a guest.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<Identity>()
            .copied()
            .unwrap_or_default();

        let Some(user_id) = identity.user_id() else {
            return Ok(MaybeUser(None));
        };

        Ok(MaybeUser(UserRepo::find_by_id(&state.pool, user_id).await?))
    }
}
