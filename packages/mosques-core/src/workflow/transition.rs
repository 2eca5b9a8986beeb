//! Pure status transitions.
//!
//! Every action is legal from every state; what differs is what it means.
//! Repeating an action is a no-op success so retried requests are harmless,
//! and moving between the two terminal states is an explicit reversal.

use serde::{Deserialize, Serialize};

use super::Capability;
use crate::error::ValidationError;
use crate::model::ModerationStatus;

/// Moderator actions on a single entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approve,
    Reject,
    Delete,
}

impl ModerationAction {
    /// Trailing path segment for `POST /moderation/{type}/{id}/{action}`.
    /// Delete has none; it is a `DELETE` on the entity itself.
    pub fn path_segment(&self) -> Option<&'static str> {
        match self {
            ModerationAction::Approve => Some("approve"),
            ModerationAction::Reject => Some("reject"),
            ModerationAction::Delete => None,
        }
    }

    pub fn capability(&self) -> Capability {
        match self {
            ModerationAction::Approve | ModerationAction::Reject => Capability::ModerateSubmissions,
            ModerationAction::Delete => Capability::DeleteRecords,
        }
    }

    pub fn target_status(&self) -> Option<ModerationStatus> {
        match self {
            ModerationAction::Approve => Some(ModerationStatus::Approved),
            ModerationAction::Reject => Some(ModerationStatus::Rejected),
            ModerationAction::Delete => None,
        }
    }
}

impl std::fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModerationAction::Approve => write!(f, "approve"),
            ModerationAction::Reject => write!(f, "reject"),
            ModerationAction::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for ModerationAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ModerationAction::Approve),
            "reject" => Ok(ModerationAction::Reject),
            "delete" => Ok(ModerationAction::Delete),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// What an action does to an entity's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// pending → approved / rejected
    Changed {
        from: ModerationStatus,
        to: ModerationStatus,
    },
    /// Already in the requested state.
    Unchanged { status: ModerationStatus },
    /// approved ↔ rejected, a moderator correcting a decision.
    Reversal {
        from: ModerationStatus,
        to: ModerationStatus,
    },
    /// Hard delete; the entity no longer exists.
    Removed { from: ModerationStatus },
}

impl Transition {
    /// Status after the transition, `None` once removed.
    pub fn to(&self) -> Option<ModerationStatus> {
        match self {
            Transition::Changed { to, .. } | Transition::Reversal { to, .. } => Some(*to),
            Transition::Unchanged { status } => Some(*status),
            Transition::Removed { .. } => None,
        }
    }

    pub fn from(&self) -> ModerationStatus {
        match self {
            Transition::Changed { from, .. }
            | Transition::Reversal { from, .. }
            | Transition::Removed { from } => *from,
            Transition::Unchanged { status } => *status,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Transition::Unchanged { .. })
    }
}

impl ModerationStatus {
    /// Next status for `action`. Never fails: see the module docs.
    pub fn apply(self, action: ModerationAction) -> Transition {
        let Some(to) = action.target_status() else {
            return Transition::Removed { from: self };
        };
        if self == to {
            Transition::Unchanged { status: self }
        } else if self.is_pending() {
            Transition::Changed { from: self, to }
        } else {
            Transition::Reversal { from: self, to }
        }
    }
}
