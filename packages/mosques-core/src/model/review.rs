use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ModerationStatus, ResourceType};
use crate::error::ValidationError;
use crate::id::{MosqueId, ReviewId};
use crate::workflow::Moderated;

/// Sub-rating names the apps offer. Other names are kept as received.
pub const CRITERIA_KEYS: &[&str] = &[
    "cleanliness",
    "accessibility",
    "women_section",
    "wudu_area",
    "parking",
    "audio_quality",
    "air_conditioning",
];

/// A star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        Self::checked("rating", value)
    }

    /// Like [`Rating::new`] but names the offending field in the error.
    pub fn checked(field: &str, value: i64) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::RatingOutOfRange {
                field: field.to_string(),
                value,
                min: Self::MIN,
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        rating.0 as i64
    }
}

/// A sub-rating in `0..=5`. The backend stores 0 for "not rated".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct CriterionScore(u8);

impl CriterionScore {
    pub const MIN: i64 = 0;

    pub fn checked(field: &str, value: i64) -> Result<Self, ValidationError> {
        if (Self::MIN..=Rating::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::RatingOutOfRange {
                field: field.to_string(),
                value,
                min: Self::MIN,
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_rated(self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<i64> for CriterionScore {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        CriterionScore::checked("criterion", value)
    }
}

impl From<CriterionScore> for i64 {
    fn from(score: CriterionScore) -> Self {
        score.0 as i64
    }
}

/// A community review of an approved mosque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub mosque_id: MosqueId,
    pub rating: Rating,
    pub comment: Option<String>,
    #[serde(default)]
    pub criteria: BTreeMap<String, CriterionScore>,
    pub status: ModerationStatus,
    #[serde(default, deserialize_with = "super::timestamp::lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Short one-line preview for list views.
    pub fn excerpt(&self, max_chars: usize) -> String {
        match &self.comment {
            Some(c) if c.chars().count() > max_chars => {
                let cut: String = c.chars().take(max_chars).collect();
                format!("{}...", cut.trim_end())
            }
            Some(c) => c.clone(),
            None => "No comment".to_string(),
        }
    }
}

impl Moderated for Review {
    fn resource(&self) -> ResourceType {
        ResourceType::Review
    }

    fn raw_id(&self) -> i64 {
        self.id.get()
    }

    fn status(&self) -> ModerationStatus {
        self.status
    }

    fn set_status(&mut self, status: ModerationStatus) {
        self.status = status;
    }
}
