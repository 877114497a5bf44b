//! Repository for the `users` table.

use agora_core::roles::Role;
use agora_core::types::DbId;

use crate::models::user::{CreateUser, User};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, username, email, password_hash, role, banned, provider, provider_id, created_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &DbPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role, provider, provider_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .bind(&input.provider)
            .bind(&input.provider_id)
            .bind(chrono::Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = ?1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email, ignoring surrounding whitespace on both sides.
    pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE TRIM(email) = ?1");
        sqlx::query_as::<_, User>(&query)
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// Whether a username is already taken.
    pub async fn username_exists(pool: &DbPool, username: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)")
            .bind(username)
            .fetch_one(pool)
            .await
    }

    /// Find the account bound to an external identity provider subject.
    pub async fn find_by_provider(
        pool: &DbPool,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE provider = ?1 AND provider_id = ?2");
        sqlx::query_as::<_, User>(&query)
            .bind(provider)
            .bind(provider_id)
            .fetch_optional(pool)
            .await
    }

    /// Bind an external identity to an existing account, returning the updated row.
    pub async fn link_provider(
        pool: &DbPool,
        id: DbId,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET provider = ?1, provider_id = ?2 WHERE id = ?3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(provider)
            .bind(provider_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the banned flag. Returns the updated row if the user exists.
    pub async fn set_banned(
        pool: &DbPool,
        id: DbId,
        banned: bool,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET banned = ?1 WHERE id = ?2 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(banned)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Change a user's role. Returns the updated row if the user exists.
    pub async fn set_role(pool: &DbPool, id: DbId, role: Role) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET role = ?1 WHERE id = ?2 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(role.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
