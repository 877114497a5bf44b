//! Repository for the `sessions` table.

use agora_core::types::{DbId, Timestamp};

use crate::models::session::Session;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, created_at, expires_at";

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Replace every session of `user_id` with a single new one.
    ///
    /// The delete and the insert run in one transaction, so at most one
    /// session row per user survives even when logins race.
    pub async fn replace_for_user(
        pool: &DbPool,
        id: &str,
        user_id: DbId,
        created_at: Timestamp,
        expires_at: Timestamp,
    ) -> Result<Session, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query("DELETE FROM sessions WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let query = format!(
            "INSERT INTO sessions (id, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(user_id)
            .bind(created_at)
            .bind(expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        if removed > 0 {
            tracing::debug!(user_id, removed, "Superseded previous sessions");
        }
        Ok(session)
    }

    /// Find a session by its raw identifier, expired or not.
    pub async fn find_by_id(pool: &DbPool, id: &str) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = ?1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move a session's expiry. Returns `true` if the row exists.
    pub async fn extend(
        pool: &DbPool,
        id: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE sessions SET expires_at = ?1 WHERE id = ?2")
            .bind(expires_at)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a single session. Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session of a user. Returns the count of deleted rows.
    pub async fn delete_for_user(pool: &DbPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions that expired before `now`. Returns the count of deleted rows.
    pub async fn delete_expired(pool: &DbPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE julianday(expires_at) < julianday(?1)")
                .bind(now)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Number of session rows held by a user.
    pub async fn count_for_user(pool: &DbPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
