use std::sync::Arc;

use agora_core::types::DbId;
use agora_db::models::notification::CreateNotification;
use agora_db::repositories::NotificationRepo;
use agora_db::DbPool;

use crate::ws::{DeliveryReport, Hub, PushEvent};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to store notification: {0}")]
    Persist(#[from] sqlx::Error),

    #[error("failed to encode push payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What happened to a best-effort notification.
#[derive(Debug)]
pub enum NotifyOutcome {
    /// The recipient is the actor; nothing was stored or pushed.
    Skipped,
    /// Stored (when applicable) and offered to the recipient's connections.
    Sent {
        notification_id: Option<DbId>,
        delivery: DeliveryReport,
    },
    /// Storing or pushing failed. The originating action still stands.
    Failed(NotifyError),
}

/// Persists notifications and fans them out through the [`Hub`].
#[derive(Clone)]
pub struct Notifier {
    pool: DbPool,
    hub: Arc<Hub>,
}

impl Notifier {
    pub fn new(pool: DbPool, hub: Arc<Hub>) -> Self {
        Self { pool, hub }
    }

    /// Record `input` and push it, plus the new unread count, to the
    /// recipient. Self-notifications are skipped.
    pub async fn notify(&self, input: CreateNotification, actor_name: &str) -> NotifyOutcome {
        if input.is_self_notification() {
            return NotifyOutcome::Skipped;
        }

        match self.try_notify(&input, actor_name).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    recipient_id = input.recipient_id,
                    actor_id = input.actor_id,
                    kind = %input.kind,
                    error = %e,
                    "Notification failed"
                );
                NotifyOutcome::Failed(e)
            }
        }
    }

    /// Push the user's current unread count to their live connections.
    pub async fn sync_unread_count(&self, user_id: DbId) -> NotifyOutcome {
        let result = async {
            let count = NotificationRepo::unread_count(&self.pool, user_id).await?;
            let delivery = self.hub.push(user_id, &PushEvent::UnreadCount { count }).await?;
            Ok::<_, NotifyError>(delivery)
        }
        .await;

        match result {
            Ok(delivery) => NotifyOutcome::Sent {
                notification_id: None,
                delivery,
            },
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Unread count push failed");
                NotifyOutcome::Failed(e)
            }
        }
    }

    async fn try_notify(
        &self,
        input: &CreateNotification,
        actor_name: &str,
    ) -> Result<NotifyOutcome, NotifyError> {
        let Some(id) = NotificationRepo::create(&self.pool, input).await? else {
            return Ok(NotifyOutcome::Skipped);
        };

        let event = PushEvent::Notification {
            id,
            kind: input.kind,
            actor_id: input.actor_id,
            actor_name: actor_name.to_string(),
            post_id: input.post_id,
            comment_id: input.comment_id,
            created_at: chrono::Utc::now(),
        };
        let mut delivery = self.hub.push(input.recipient_id, &event).await?;

        let count = NotificationRepo::unread_count(&self.pool, input.recipient_id).await?;
        let unread = self
            .hub
            .push(input.recipient_id, &PushEvent::UnreadCount { count })
            .await?;
        delivery.evicted += unread.evicted;

        tracing::debug!(
            notification_id = id,
            recipient_id = input.recipient_id,
            delivered = delivery.delivered,
            evicted = delivery.evicted,
            "Notification sent"
        );

        Ok(NotifyOutcome::Sent {
            notification_id: Some(id),
            delivery,
        })
    }
}
