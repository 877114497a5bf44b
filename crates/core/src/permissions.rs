//! Ownership-based permission evaluation for posts and comments.
//!
//! The evaluator is an explicit allow-list: only [`Action::Edit`] and
//! [`Action::Delete`] can ever be granted, and any action string that does
//! not parse into a known [`Action`] is denied.

use std::str::FromStr;

use crate::roles::Role;
use crate::types::DbId;

/// The acting user as seen by the permission evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: DbId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: DbId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Mutating actions that are subject to ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit" => Ok(Action::Edit),
            "delete" => Ok(Action::Delete),
            _ => Err(()),
        }
    }
}

/// Whether `actor` may perform `action` on a resource owned by
/// `resource_owner_id`.
///
/// Staff roles may edit and delete anything; everyone else only what they own.
pub fn is_allowed(actor: &Actor, resource_owner_id: DbId, action: Action) -> bool {
    match action {
        Action::Edit | Action::Delete => actor.role.is_staff() || actor.id == resource_owner_id,
    }
}

/// String-keyed form of [`is_allowed`]. Unrecognised actions are denied.
pub fn has_permission(actor: &Actor, resource_owner_id: DbId, action: &str) -> bool {
    action
        .parse::<Action>()
        .is_ok_and(|action| is_allowed(actor, resource_owner_id, action))
}
