//! Repository for the `notifications` table.

use agora_core::types::DbId;

use crate::models::notification::{CreateNotification, NotificationView};
use crate::DbPool;

/// Provides CRUD operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Record a notification, returning its ID.
    ///
    /// Returns `Ok(None)` without touching the database when the recipient
    /// is the actor.
    pub async fn create(
        pool: &DbPool,
        input: &CreateNotification,
    ) -> Result<Option<DbId>, sqlx::Error> {
        if input.is_self_notification() {
            return Ok(None);
        }

        let id = sqlx::query_scalar(
            "INSERT INTO notifications (user_id, actor_id, post_id, comment_id, type, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             RETURNING id",
        )
        .bind(input.recipient_id)
        .bind(input.actor_id)
        .bind(input.post_id)
        .bind(input.comment_id)
        .bind(input.kind.as_str())
        .bind(chrono::Utc::now())
        .fetch_one(pool)
        .await?;
        Ok(Some(id))
    }

    /// List notifications for a user, newest first, with actor and post
    /// display data.
    ///
    /// When `unread_only` is `true`, only notifications with `is_read = false`
    /// are returned.
    pub async fn list_for_user(
        pool: &DbPool,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationView>, sqlx::Error> {
        let filter = if unread_only {
            "AND n.is_read = FALSE"
        } else {
            ""
        };
        let query = format!(
            "SELECT n.id, n.type, n.post_id, p.title AS post_title, n.comment_id, \
                    n.actor_id, u.username AS actor_name, n.is_read, n.created_at \
             FROM notifications n \
             JOIN users u ON u.id = n.actor_id \
             LEFT JOIN posts p ON p.id = n.post_id \
             WHERE n.user_id = ?1 {filter} \
             ORDER BY n.created_at DESC, n.id DESC \
             LIMIT ?2 OFFSET ?3"
        );
        sqlx::query_as::<_, NotificationView>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification exists and belongs to `user_id`,
    /// whether or not it was already read.
    pub async fn mark_read(
        pool: &DbPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = TRUE \
             WHERE id = ?1 AND user_id = ?2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read for a user.
    ///
    /// Returns the number of notifications that changed state.
    pub async fn mark_all_read(pool: &DbPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = TRUE \
             WHERE user_id = ?1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Get the number of unread notifications for a user.
    pub async fn unread_count(pool: &DbPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
