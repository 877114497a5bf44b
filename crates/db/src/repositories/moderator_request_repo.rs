//! Repository for the `moderator_requests` table.

use agora_core::promotion::RequestStatus;
use agora_core::roles::{ROLE_MODERATOR, ROLE_USER};
use agora_core::types::DbId;

use crate::models::moderator_request::{ModeratorRequest, PendingModeratorRequest};
use crate::DbPool;

const COLUMNS: &str = "id, user_id, status, requested_at, reviewed_at, reviewed_by";

/// Provides access to moderator promotion requests.
pub struct ModeratorRequestRepo;

impl ModeratorRequestRepo {
    /// File a pending request for `user_id`.
    ///
    /// Fails with a unique violation if one is already pending.
    pub async fn create(pool: &DbPool, user_id: DbId) -> Result<ModeratorRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO moderator_requests (user_id, status, requested_at)
             VALUES (?1, ?2, ?3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModeratorRequest>(&query)
            .bind(user_id)
            .bind(RequestStatus::Pending.as_str())
            .bind(chrono::Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &DbPool,
        id: DbId,
    ) -> Result<Option<ModeratorRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM moderator_requests WHERE id = ?1");
        sqlx::query_as::<_, ModeratorRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `user_id` has a request awaiting review.
    pub async fn has_pending(pool: &DbPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM moderator_requests WHERE user_id = ?1 AND status = ?2)",
        )
        .bind(user_id)
        .bind(RequestStatus::Pending.as_str())
        .fetch_one(pool)
        .await
    }

    /// The most recent request filed by `user_id`, if any.
    pub async fn latest_for_user(
        pool: &DbPool,
        user_id: DbId,
    ) -> Result<Option<ModeratorRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM moderator_requests
             WHERE user_id = ?1
             ORDER BY requested_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ModeratorRequest>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Pending requests, oldest first.
    pub async fn list_pending(pool: &DbPool) -> Result<Vec<PendingModeratorRequest>, sqlx::Error> {
        sqlx::query_as::<_, PendingModeratorRequest>(
            "SELECT r.id, r.user_id, u.username, r.requested_at
             FROM moderator_requests r
             JOIN users u ON u.id = r.user_id
             WHERE r.status = ?1
             ORDER BY r.requested_at ASC, r.id ASC",
        )
        .bind(RequestStatus::Pending.as_str())
        .fetch_all(pool)
        .await
    }

    /// Approve a pending request and make its author a moderator.
    ///
    /// Returns `None` when no pending request has that id. Only a plain
    /// user is promoted; an author who became admin meanwhile keeps the role.
    pub async fn approve(
        pool: &DbPool,
        id: DbId,
        reviewer_id: DbId,
    ) -> Result<Option<ModeratorRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(request) = Self::review(&mut *tx, id, reviewer_id, RequestStatus::Approved).await?
        else {
            return Ok(None);
        };

        sqlx::query("UPDATE users SET role = ?1 WHERE id = ?2 AND role = ?3")
            .bind(ROLE_MODERATOR)
            .bind(request.user_id)
            .bind(ROLE_USER)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(request))
    }

    /// Reject a pending request. Returns `None` when no pending request has
    /// that id.
    pub async fn reject(
        pool: &DbPool,
        id: DbId,
        reviewer_id: DbId,
    ) -> Result<Option<ModeratorRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let request = Self::review(&mut *tx, id, reviewer_id, RequestStatus::Rejected).await?;
        tx.commit().await?;
        Ok(request)
    }

    /// Move a pending request to `decision`. The update is the first
    /// statement of the transaction so it takes the write lock up front.
    async fn review(
        tx: &mut sqlx::SqliteConnection,
        id: DbId,
        reviewer_id: DbId,
        decision: RequestStatus,
    ) -> Result<Option<ModeratorRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE moderator_requests
             SET status = ?1, reviewed_at = ?2, reviewed_by = ?3
             WHERE id = ?4 AND status = ?5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModeratorRequest>(&query)
            .bind(decision.as_str())
            .bind(chrono::Utc::now())
            .bind(reviewer_id)
            .bind(id)
            .bind(RequestStatus::Pending.as_str())
            .fetch_optional(tx)
            .await
    }
}
