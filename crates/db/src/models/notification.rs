//! Notification entity models and DTOs.

use agora_core::notification::NotificationKind;
use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A notification joined with display data for listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationView {
    pub id: DbId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub post_id: Option<DbId>,
    pub post_title: Option<String>,
    pub comment_id: Option<DbId>,
    pub actor_id: DbId,
    pub actor_name: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateNotification {
    pub recipient_id: DbId,
    pub actor_id: DbId,
    pub post_id: DbId,
    pub comment_id: Option<DbId>,
    pub kind: NotificationKind,
}

impl CreateNotification {
    /// Self-notifications are never stored.
    pub fn is_self_notification(&self) -> bool {
        self.recipient_id == self.actor_id
    }
}
