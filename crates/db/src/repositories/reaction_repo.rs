//! Repository for the `reactions` table.
//!
//! A user holds at most one reaction per post and per comment. Reacting
//! again with the same kind withdraws the reaction; reacting with the other
//! kind switches it.

use agora_core::notification::Reaction;
use agora_core::types::DbId;
use serde::Serialize;

use crate::DbPool;

/// What a reaction is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTarget {
    Post(DbId),
    Comment(DbId),
}

impl ReactionTarget {
    fn column(self) -> &'static str {
        match self {
            ReactionTarget::Post(_) => "post_id",
            ReactionTarget::Comment(_) => "comment_id",
        }
    }

    fn id(self) -> DbId {
        match self {
            ReactionTarget::Post(id) | ReactionTarget::Comment(id) => id,
        }
    }
}

/// Outcome of [`ReactionRepo::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    /// No reaction existed; one was recorded.
    Added,
    /// The previous reaction of the other kind was replaced.
    Switched,
    /// The same reaction existed and was withdrawn.
    Removed,
}

impl ReactionChange {
    /// Additions and switches notify the content author; withdrawals do not.
    pub fn notifies(self) -> bool {
        !matches!(self, ReactionChange::Removed)
    }
}

/// Aggregated reaction counts for a single target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ReactionCounts {
    pub likes: i64,
    pub dislikes: i64,
}

/// Provides reaction toggling and aggregation.
pub struct ReactionRepo;

impl ReactionRepo {
    /// Apply `reaction` from `user_id` to `target` using toggle semantics.
    ///
    /// The transaction opens with a write so it takes the write lock up
    /// front. A read-then-write transaction cannot wait on a busy database
    /// in WAL mode and fails immediately instead.
    pub async fn toggle(
        pool: &DbPool,
        user_id: DbId,
        target: ReactionTarget,
        reaction: Reaction,
    ) -> Result<ReactionChange, sqlx::Error> {
        let column = target.column();
        let mut tx = pool.begin().await?;

        let previous: Option<String> = sqlx::query_scalar(&format!(
            "DELETE FROM reactions WHERE user_id = ?1 AND {column} = ?2 RETURNING reaction"
        ))
        .bind(user_id)
        .bind(target.id())
        .fetch_optional(&mut *tx)
        .await?;

        let change = match previous.as_deref() {
            Some(current) if current == reaction.as_str() => ReactionChange::Removed,
            Some(_) => ReactionChange::Switched,
            None => ReactionChange::Added,
        };

        if change != ReactionChange::Removed {
            sqlx::query(&format!(
                "INSERT INTO reactions (user_id, {column}, reaction, created_at) \
                 VALUES (?1, ?2, ?3, ?4)"
            ))
            .bind(user_id)
            .bind(target.id())
            .bind(reaction.as_str())
            .bind(chrono::Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(change)
    }

    /// Count likes and dislikes on `target`.
    pub async fn counts(pool: &DbPool, target: ReactionTarget) -> Result<ReactionCounts, sqlx::Error> {
        let column = target.column();
        sqlx::query_as::<_, ReactionCounts>(&format!(
            "SELECT \
                COALESCE(SUM(CASE WHEN reaction = 'like' THEN 1 ELSE 0 END), 0) AS likes, \
                COALESCE(SUM(CASE WHEN reaction = 'dislike' THEN 1 ELSE 0 END), 0) AS dislikes \
             FROM reactions WHERE {column} = ?1"
        ))
        .bind(target.id())
        .fetch_one(pool)
        .await
    }

    /// The reaction `user_id` currently holds on `target`, if any.
    pub async fn find_for_user(
        pool: &DbPool,
        user_id: DbId,
        target: ReactionTarget,
    ) -> Result<Option<Reaction>, sqlx::Error> {
        let column = target.column();
        let stored: Option<String> = sqlx::query_scalar(&format!(
            "SELECT reaction FROM reactions WHERE user_id = ?1 AND {column} = ?2"
        ))
        .bind(user_id)
        .bind(target.id())
        .fetch_optional(pool)
        .await?;
        Ok(stored.as_deref().and_then(Reaction::parse))
    }
}
