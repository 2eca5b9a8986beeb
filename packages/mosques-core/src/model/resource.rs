use serde::{Deserialize, Serialize};

use super::ModerationStatus;
use crate::error::ValidationError;

/// The three moderated collections.
///
/// Dispatch on this enum replaces positional tab indices: every URL and
/// wire spelling is derived from the variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MosqueSuggestion,
    Review,
    EditProposal,
}

impl ResourceType {
    pub fn all() -> &'static [ResourceType] {
        &[
            ResourceType::MosqueSuggestion,
            ResourceType::Review,
            ResourceType::EditProposal,
        ]
    }

    /// Path segment under `/moderation/`.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceType::MosqueSuggestion => "suggestions",
            ResourceType::Review => "reviews",
            ResourceType::EditProposal => "edits",
        }
    }

    /// Reviews are moderated but never confirmed by the community.
    pub fn supports_confirmation(&self) -> bool {
        !matches!(self, ResourceType::Review)
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suggestions" | "suggestion" | "mosques" | "mosque_suggestion" => {
                Ok(ResourceType::MosqueSuggestion)
            }
            "reviews" | "review" => Ok(ResourceType::Review),
            "edits" | "edit" | "edit_proposal" => Ok(ResourceType::EditProposal),
            other => Err(ValidationError::UnknownResource(other.to_string())),
        }
    }
}

/// Status filter for moderation list views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    Pending,
    Approved,
    Rejected,
    All,
}

impl StatusFilter {
    pub fn matches(&self, status: ModerationStatus) -> bool {
        match self {
            StatusFilter::Pending => status.is_pending(),
            StatusFilter::Approved => status == ModerationStatus::Approved,
            StatusFilter::Rejected => status == ModerationStatus::Rejected,
            StatusFilter::All => true,
        }
    }

    /// The `status=` query value the given collection understands.
    pub fn wire_value(&self, resource: ResourceType) -> &'static str {
        match (self, resource) {
            (StatusFilter::Pending, ResourceType::MosqueSuggestion) => "pending_approval",
            (StatusFilter::Pending, _) => "pending",
            (StatusFilter::Approved, _) => "approved",
            (StatusFilter::Rejected, _) => "rejected",
            (StatusFilter::All, _) => "all",
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::Pending => write!(f, "pending"),
            StatusFilter::Approved => write!(f, "approved"),
            StatusFilter::Rejected => write!(f, "rejected"),
            StatusFilter::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" | "pending_approval" => Ok(StatusFilter::Pending),
            "approved" => Ok(StatusFilter::Approved),
            "rejected" => Ok(StatusFilter::Rejected),
            "all" => Ok(StatusFilter::All),
            _ => Err(ValidationError::UnknownStatus(s.to_string())),
        }
    }
}

/// A moderated entity addressed by collection and raw id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetRef {
    pub resource: ResourceType,
    pub id: i64,
}

impl TargetRef {
    pub fn new(resource: ResourceType, id: i64) -> Self {
        Self { resource, id }
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.resource, self.id)
    }
}
