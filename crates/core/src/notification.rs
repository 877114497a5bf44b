//! Notification and reaction kinds.
//!
//! Both are stored and transmitted in one canonical lowercase spelling
//! (`like`, `dislike`, `comment`, `reply`). Incoming reaction names are
//! normalised at the boundary via [`Reaction::parse`], so mixed casing from
//! clients never reaches storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A user's reaction to a post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    pub fn as_str(self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Dislike => "dislike",
        }
    }

    /// Parse a reaction name, ignoring case and surrounding whitespace.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "like" => Some(Reaction::Like),
            "dislike" => Some(Reaction::Dislike),
            _ => None,
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to produce a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Dislike,
    Comment,
    Reply,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Dislike => "dislike",
            NotificationKind::Comment => "comment",
            NotificationKind::Reply => "reply",
        }
    }
}

impl From<Reaction> for NotificationKind {
    fn from(reaction: Reaction) -> Self {
        match reaction {
            Reaction::Like => NotificationKind::Like,
            Reaction::Dislike => NotificationKind::Dislike,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification kind: {0}")]
pub struct UnknownNotificationKind(pub String);

impl FromStr for NotificationKind {
    type Err = UnknownNotificationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(NotificationKind::Like),
            "dislike" => Ok(NotificationKind::Dislike),
            "comment" => Ok(NotificationKind::Comment),
            "reply" => Ok(NotificationKind::Reply),
            other => Err(UnknownNotificationKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_parsing_normalises_case() {
        assert_eq!(Reaction::parse("like"), Some(Reaction::Like));
        assert_eq!(Reaction::parse("Like"), Some(Reaction::Like));
        assert_eq!(Reaction::parse(" DISLIKE "), Some(Reaction::Dislike));
        assert_eq!(Reaction::parse("love"), None);
        assert_eq!(Reaction::parse(""), None);
    }

    #[test]
    fn reaction_maps_to_notification_kind_with_same_spelling() {
        for reaction in [Reaction::Like, Reaction::Dislike] {
            let kind = NotificationKind::from(reaction);
            assert_eq!(kind.as_str(), reaction.as_str());
        }
    }

    #[test]
    fn kind_round_trips_through_storage_spelling() {
        for kind in [
            NotificationKind::Like,
            NotificationKind::Dislike,
            NotificationKind::Comment,
            NotificationKind::Reply,
        ] {
            assert_eq!(kind.as_str().parse::<NotificationKind>(), Ok(kind));
        }
        assert!("Like".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&NotificationKind::Reply).expect("serialize");
        assert_eq!(json, "\"reply\"");
        let reaction: Reaction = serde_json::from_str("\"dislike\"").expect("deserialize");
        assert_eq!(reaction, Reaction::Dislike);
    }
}
