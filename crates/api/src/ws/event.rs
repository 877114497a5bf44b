use agora_core::notification::NotificationKind;
use agora_core::types::{DbId, Timestamp};
use serde::Serialize;

/// A message pushed to a user's live connections, serialized as a JSON text
/// frame tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// Someone reacted to or replied to the user's content.
    Notification {
        id: DbId,
        kind: NotificationKind,
        actor_id: DbId,
        actor_name: String,
        post_id: DbId,
        comment_id: Option<DbId>,
        created_at: Timestamp,
    },
    /// The user's unread total changed.
    UnreadCount { count: i64 },
}
