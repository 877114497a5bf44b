//! Comment entity model and DTOs.

use agora_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub post_id: DbId,
    pub user_id: DbId,
    pub parent_comment_id: Option<DbId>,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// DTO for creating a comment or a reply.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub content: String,
    pub parent_comment_id: Option<DbId>,
}
