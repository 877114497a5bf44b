//! Domain errors shared by the `db` and `api` crates.
//!
//! Each variant maps onto one HTTP status at the API boundary; anything
//! that should surface as a 500 is raised by the API layer itself.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The addressed row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request clashes with current state, e.g. a duplicate pending
    /// promotion request or one that was already reviewed.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No usable session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}
