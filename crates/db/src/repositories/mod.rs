//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&DbPool` as the first argument.

pub mod comment_repo;
pub mod moderator_request_repo;
pub mod notification_repo;
pub mod post_repo;
pub mod reaction_repo;
pub mod session_repo;
pub mod user_repo;

pub use comment_repo::CommentRepo;
pub use moderator_request_repo::ModeratorRequestRepo;
pub use notification_repo::NotificationRepo;
pub use post_repo::PostRepo;
pub use reaction_repo::{ReactionChange, ReactionCounts, ReactionRepo, ReactionTarget};
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
