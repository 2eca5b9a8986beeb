use serde::Serialize;

use super::{EditProposal, ModerationStatus, MosqueSuggestion, ResourceType, Review};
use crate::workflow::Moderated;

/// One row of a moderation list, whatever the collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModerationItem {
    Suggestion(MosqueSuggestion),
    Review(Review),
    Edit(EditProposal),
}

impl ModerationItem {
    /// `None` for reviews, which are never community-confirmed.
    pub fn confirmations_count(&self) -> Option<u32> {
        match self {
            ModerationItem::Suggestion(s) => Some(s.confirmations_count),
            ModerationItem::Review(_) => None,
            ModerationItem::Edit(e) => Some(e.confirmations_count),
        }
    }

    pub fn title(&self) -> String {
        match self {
            ModerationItem::Suggestion(s) => s.display_name(),
            ModerationItem::Review(r) => format!("Rating: {}/5", r.rating.get()),
            ModerationItem::Edit(e) => format!("Edit for mosque #{}", e.mosque_id),
        }
    }

    pub fn subtitle(&self) -> String {
        match self {
            ModerationItem::Suggestion(s) => {
                let kind = s.mosque_type.map(|t| t.to_string()).unwrap_or_default();
                let place = s.city.clone().unwrap_or_else(|| s.governorate.clone());
                let mut line = format!("{} {}", kind, place).trim().to_string();
                if !s.is_mappable() {
                    line.push_str(" (no location)");
                }
                line
            }
            ModerationItem::Review(r) => r.excerpt(40),
            ModerationItem::Edit(e) => e.summary(),
        }
    }
}

impl Moderated for ModerationItem {
    fn resource(&self) -> ResourceType {
        match self {
            ModerationItem::Suggestion(s) => s.resource(),
            ModerationItem::Review(r) => r.resource(),
            ModerationItem::Edit(e) => e.resource(),
        }
    }

    fn raw_id(&self) -> i64 {
        match self {
            ModerationItem::Suggestion(s) => s.raw_id(),
            ModerationItem::Review(r) => r.raw_id(),
            ModerationItem::Edit(e) => e.raw_id(),
        }
    }

    fn status(&self) -> ModerationStatus {
        match self {
            ModerationItem::Suggestion(s) => s.status,
            ModerationItem::Review(r) => r.status,
            ModerationItem::Edit(e) => e.status,
        }
    }

    fn set_status(&mut self, status: ModerationStatus) {
        match self {
            ModerationItem::Suggestion(s) => s.status = status,
            ModerationItem::Review(r) => r.status = status,
            ModerationItem::Edit(e) => e.status = status,
        }
    }
}

impl From<MosqueSuggestion> for ModerationItem {
    fn from(s: MosqueSuggestion) -> Self {
        ModerationItem::Suggestion(s)
    }
}

impl From<Review> for ModerationItem {
    fn from(r: Review) -> Self {
        ModerationItem::Review(r)
    }
}

impl From<EditProposal> for ModerationItem {
    fn from(e: EditProposal) -> Self {
        ModerationItem::Edit(e)
    }
}
