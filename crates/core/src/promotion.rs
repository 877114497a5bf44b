//! Requests from regular users to be promoted to moderator.
//!
//! A user holds at most one pending request. An admin reviews it once,
//! approving (which grants the moderator role) or rejecting it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Review state of a stored request. Must match the `CHECK` constraint on
/// `moderator_requests.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Parse a stored status. Unknown values read as pending so they stay
    /// in the review queue rather than counting as a decision.
    pub fn from_stored(name: &str) -> Self {
        match name {
            "approved" => RequestStatus::Approved,
            "rejected" => RequestStatus::Rejected,
            _ => RequestStatus::Pending,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a user is told about their own promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    NotRequested,
    Pending,
    Approved,
    Rejected,
}

/// Only regular users may ask for promotion.
pub fn may_request(role: Role) -> bool {
    role == Role::User
}

/// Combine the user's current role with their most recent request.
///
/// Staff always read as approved. Otherwise the latest request decides.
pub fn promotion_status(role: Role, latest: Option<RequestStatus>) -> PromotionStatus {
    if role.is_staff() {
        return PromotionStatus::Approved;
    }
    match latest {
        None => PromotionStatus::NotRequested,
        Some(RequestStatus::Pending) => PromotionStatus::Pending,
        Some(RequestStatus::Approved) => PromotionStatus::Approved,
        Some(RequestStatus::Rejected) => PromotionStatus::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_status_names() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
        ] {
            assert_eq!(RequestStatus::from_stored(status.as_str()), status);
        }
        assert_eq!(RequestStatus::from_stored("APPROVED"), RequestStatus::Pending);
    }

    #[test]
    fn only_regular_users_may_request() {
        assert!(may_request(Role::User));
        assert!(!may_request(Role::Moderator));
        assert!(!may_request(Role::Admin));
    }

    #[test]
    fn staff_read_as_approved_whatever_their_history() {
        assert_eq!(promotion_status(Role::Moderator, None), PromotionStatus::Approved);
        assert_eq!(
            promotion_status(Role::Admin, Some(RequestStatus::Rejected)),
            PromotionStatus::Approved
        );
    }

    #[test]
    fn users_see_their_latest_request() {
        assert_eq!(promotion_status(Role::User, None), PromotionStatus::NotRequested);
        assert_eq!(
            promotion_status(Role::User, Some(RequestStatus::Pending)),
            PromotionStatus::Pending
        );
        assert_eq!(
            promotion_status(Role::User, Some(RequestStatus::Rejected)),
            PromotionStatus::Rejected
        );
    }

    #[test]
    fn status_serializes_in_snake_case() {
        let json = serde_json::to_value(PromotionStatus::NotRequested).unwrap();
        assert_eq!(json, "not_requested");
    }
}
