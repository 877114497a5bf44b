//! Repository for the `comments` table.

use agora_core::types::DbId;

use crate::models::comment::Comment;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, post_id, user_id, parent_comment_id, content, created_at, updated_at";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a comment (or a reply when `parent_comment_id` is set).
    pub async fn create(
        pool: &DbPool,
        post_id: DbId,
        user_id: DbId,
        parent_comment_id: Option<DbId>,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (post_id, user_id, parent_comment_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(post_id)
            .bind(user_id)
            .bind(parent_comment_id)
            .bind(content)
            .bind(chrono::Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Find a comment by its internal ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = ?1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a post's comments in the order they were written.
    pub async fn list_for_post(pool: &DbPool, post_id: DbId) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments WHERE post_id = ?1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    /// Replace a comment's content. Returns `None` if not found.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        content: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET content = ?1, updated_at = ?2
             WHERE id = ?3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(content)
            .bind(chrono::Utc::now())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a comment and its replies. Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
