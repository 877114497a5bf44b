//! Repository for the `posts` table.

use agora_core::types::DbId;

use crate::models::post::{Post, PostInput};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

/// Provides CRUD operations for posts.
pub struct PostRepo;

impl PostRepo {
    /// Insert a new post authored by `user_id`, returning the created row.
    pub async fn create(pool: &DbPool, user_id: DbId, input: &PostInput) -> Result<Post, sqlx::Error> {
        let query = format!(
            "INSERT INTO posts (user_id, title, content, created_at)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(chrono::Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Find a post by its internal ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = ?1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List posts, newest first.
    pub async fn list(pool: &DbPool, limit: i64, offset: i64) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM posts ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Replace a post's title and content. Returns `None` if not found.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        input: &PostInput,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET title = ?1, content = ?2, updated_at = ?3
             WHERE id = ?4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(&input.title)
            .bind(&input.content)
            .bind(chrono::Utc::now())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a post with its comments, reactions and notifications.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
