use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Moderation state shared by suggestions, reviews and edit proposals.
///
/// The API spells the initial state differently per collection
/// (`pending_approval` for suggestions, `pending` for reviews and edits,
/// `pending_ai_review` while the AI screen runs); all of them are pending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    #[serde(alias = "pending", alias = "pending_ai_review")]
    PendingApproval,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ModerationStatus::PendingApproval)
    }

    /// Approved and rejected are terminal; only a moderator reversal leaves them.
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }
}

impl std::fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModerationStatus::PendingApproval => write!(f, "pending_approval"),
            ModerationStatus::Approved => write!(f, "approved"),
            ModerationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ModerationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_approval" | "pending" | "pending_ai_review" => {
                Ok(ModerationStatus::PendingApproval)
            }
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            _ => Err(ValidationError::UnknownStatus(s.to_string())),
        }
    }
}
