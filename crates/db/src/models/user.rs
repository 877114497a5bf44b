//! User entity model and DTOs.

use agora_core::permissions::Actor;
use agora_core::roles::Role;
use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub banned: bool,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub created_at: Timestamp,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_stored(&self.role)
    }

    /// The user as seen by the permission evaluator.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role())
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub banned: bool,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role(),
            banned: user.banned,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
}
