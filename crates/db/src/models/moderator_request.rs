//! Moderator promotion request models.

use agora_core::promotion::RequestStatus;
use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `moderator_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ModeratorRequest {
    pub id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub requested_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
    pub reviewed_by: Option<DbId>,
}

impl ModeratorRequest {
    pub fn status(&self) -> RequestStatus {
        RequestStatus::from_stored(&self.status)
    }
}

/// A pending request joined with the requester's name, for the review queue.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingModeratorRequest {
    pub id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub requested_at: Timestamp,
}
