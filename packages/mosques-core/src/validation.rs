//! Payload parsing and local draft checks.
//!
//! Inbound: raw JSON from the moderation endpoints becomes a typed
//! [`ModerationItem`] or a [`ValidationError`]; nothing half-parsed reaches
//! workflow logic.
//!
//! Outbound: drafts are checked before a request is built, so an invalid
//! review or an empty edit never costs a round-trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::id::MosqueId;
use crate::model::mosque::is_clock_time;
use crate::model::{
    Coordinates, CriterionScore, EditProposal, Facilities, IqamaSchedule, ModerationItem, MosquePatch,
    MosqueSuggestion, MosqueType, Rating, ResourceType, Review, EDITABLE_FIELDS,
};

/// Local checks run before a draft is sent.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

// =============================================================================
// Inbound payloads
// =============================================================================

/// Parse one moderation payload for the given collection.
pub fn parse_item(resource: ResourceType, value: Value) -> Result<ModerationItem, ValidationError> {
    let malformed = |e: serde_json::Error| ValidationError::Malformed {
        resource,
        message: e.to_string(),
    };

    let item = match resource {
        ResourceType::MosqueSuggestion => {
            ModerationItem::Suggestion(serde_json::from_value::<MosqueSuggestion>(value).map_err(malformed)?)
        }
        ResourceType::Review => {
            ModerationItem::Review(serde_json::from_value::<Review>(value).map_err(malformed)?)
        }
        ResourceType::EditProposal => {
            ModerationItem::Edit(serde_json::from_value::<EditProposal>(value).map_err(malformed)?)
        }
    };
    Ok(item)
}

/// A parsed list response. Elements that failed to parse are set aside in
/// `rejected`; the rest of the page is still usable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub items: Vec<ModerationItem>,
    pub rejected: Vec<ValidationError>,
}

/// Parse a list response. Accepts a bare array or an `{"items": [...]}`
/// envelope. Only a body that is not a list at all is an error.
pub fn parse_items(resource: ResourceType, value: Value) -> Result<ParsedPage, ValidationError> {
    let elements = match value {
        Value::Array(elements) => elements,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(elements)) => elements,
            _ => {
                return Err(ValidationError::Malformed {
                    resource,
                    message: "expected a JSON array".to_string(),
                })
            }
        },
        other => {
            return Err(ValidationError::Malformed {
                resource,
                message: format!("expected a JSON array, got {}", other),
            })
        }
    };

    let mut page = ParsedPage::default();
    for element in elements {
        match parse_item(resource, element) {
            Ok(item) => page.items.push(item),
            Err(e) => page.rejected.push(e),
        }
    }
    Ok(page)
}

// =============================================================================
// Drafts
// =============================================================================

/// A review as typed by a user, before it is checked.
///
/// `rating` stays optional here so a missing value is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub criteria: BTreeMap<String, i64>,
}

impl ReviewDraft {
    pub fn new(rating: i64) -> Self {
        Self {
            rating: Some(rating),
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_criterion(mut self, name: impl Into<String>, value: i64) -> Self {
        self.criteria.insert(name.into(), value);
        self
    }
}

impl Validate for ReviewDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        let rating = self.rating.ok_or(ValidationError::MissingField("rating"))?;
        Rating::new(rating)?;
        for (name, value) in &self.criteria {
            CriterionScore::checked(name, *value)?;
        }
        Ok(())
    }
}

/// A new mosque proposed by a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arabic_name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mosque_type: Option<MosqueType>,
    pub governorate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub facilities: Facilities,
    #[serde(default)]
    pub iqama_times: IqamaSchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jumuah_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Validate for SuggestionDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.governorate.trim().is_empty() {
            return Err(ValidationError::MissingField("governorate"));
        }

        // Location is optional, but half a location is a typo.
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => {
                Coordinates::new(lat, lng)?;
            }
            (Some(_), None) => return Err(ValidationError::MissingField("longitude")),
            (None, Some(_)) => return Err(ValidationError::MissingField("latitude")),
            (None, None) => {}
        }

        if let Some(time) = &self.jumuah_time {
            if !is_clock_time(time) {
                return Err(ValidationError::InvalidTime {
                    field: "jumuah_time".to_string(),
                    value: time.clone(),
                });
            }
        }
        self.iqama_times.validate()
    }
}

/// A proposed change to an approved mosque. Serializes as the request body
/// (`{"patch": {...}}`); the mosque id goes in the URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditDraft {
    #[serde(skip)]
    pub mosque_id: MosqueId,
    pub patch: MosquePatch,
}

impl EditDraft {
    pub fn new(mosque_id: MosqueId, patch: MosquePatch) -> Self {
        Self { mosque_id, patch }
    }

    /// Build a draft from loose field/value pairs, as a form or the CLI
    /// would collect them. Keys outside the allowlist are refused by name.
    pub fn from_changes(
        mosque_id: MosqueId,
        changes: serde_json::Map<String, Value>,
    ) -> Result<Self, ValidationError> {
        if let Some(key) = changes.keys().find(|k| !EDITABLE_FIELDS.contains(&k.as_str())) {
            return Err(ValidationError::FieldNotEditable(key.clone()));
        }
        let patch: MosquePatch =
            serde_json::from_value(Value::Object(changes)).map_err(|e| ValidationError::Malformed {
                resource: ResourceType::EditProposal,
                message: e.to_string(),
            })?;
        Ok(Self::new(mosque_id, patch))
    }
}

impl Validate for EditDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        self.patch.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModerationStatus;
    use crate::workflow::Moderated;
    use serde_json::json;

    #[test]
    fn test_review_without_rating_is_rejected() {
        let draft = ReviewDraft {
            comment: Some("Very clean".to_string()),
            ..Default::default()
        };
        assert_eq!(draft.validate(), Err(ValidationError::MissingField("rating")));
    }

    #[test]
    fn test_review_rating_bounds() {
        assert!(ReviewDraft::new(5).validate().is_ok());
        assert!(matches!(
            ReviewDraft::new(0).validate(),
            Err(ValidationError::RatingOutOfRange { value: 0, .. })
        ));
        assert!(matches!(
            ReviewDraft::new(4).with_criterion("parking", 6).validate(),
            Err(ValidationError::RatingOutOfRange { ref field, value: 6, .. }) if field == "parking"
        ));
        assert!(ReviewDraft::new(4).with_criterion("parking", 0).validate().is_ok());
    }

    #[test]
    fn test_suggestion_requires_governorate() {
        let draft = SuggestionDraft::default();
        assert_eq!(draft.validate(), Err(ValidationError::MissingField("governorate")));
    }

    #[test]
    fn test_suggestion_coordinates() {
        let mut draft = SuggestionDraft {
            governorate: "Tunis".to_string(),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());

        draft.latitude = Some(36.8);
        assert_eq!(draft.validate(), Err(ValidationError::MissingField("longitude")));

        draft.longitude = Some(200.0);
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_edit_from_changes_refuses_unknown_fields() {
        let changes = json!({ "arabic_name": "x" });
        let Value::Object(changes) = changes else { unreachable!() };

        assert_eq!(
            EditDraft::from_changes(MosqueId::new(4), changes),
            Err(ValidationError::FieldNotEditable("arabic_name".to_string()))
        );
    }

    #[test]
    fn test_edit_draft_checks_patch() {
        let empty = EditDraft::new(MosqueId::new(4), MosquePatch::default());
        assert_eq!(empty.validate(), Err(ValidationError::EmptyPatch));

        let changes = json!({ "jumuah_time": "25:00" });
        let Value::Object(changes) = changes else { unreachable!() };
        let draft = EditDraft::from_changes(MosqueId::new(4), changes).unwrap();
        assert!(matches!(draft.validate(), Err(ValidationError::InvalidTime { .. })));

        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body, json!({ "patch": { "jumuah_time": "25:00" } }));
    }

    #[test]
    fn test_parse_items_keeps_unmappable_suggestions() {
        let payload = json!([
            { "id": 1, "governorate": "Sfax", "latitude": 34.7, "longitude": 10.7, "status": "pending_approval" },
            { "id": 2, "governorate": "Sfax", "status": "pending_approval" }
        ]);

        let items = parse_items(ResourceType::MosqueSuggestion, payload).unwrap().items;

        assert_eq!(items.len(), 2);
        assert!(items[1].subtitle().ends_with("(no location)"));
    }

    #[test]
    fn test_parse_item_review_out_of_range() {
        let payload = json!({ "id": 7, "mosque_id": 1, "rating": 9, "status": "pending" });

        let err = parse_item(ResourceType::Review, payload).unwrap_err();

        assert!(matches!(
            err,
            ValidationError::Malformed {
                resource: ResourceType::Review,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_item_pending_alias() {
        let payload = json!({
            "id": 23, "mosque_id": 4, "patch": { "eid_info": "7:00" }, "status": "pending"
        });

        let item = parse_item(ResourceType::EditProposal, payload).unwrap();

        assert_eq!(item.status(), ModerationStatus::PendingApproval);
        assert_eq!(item.confirmations_count(), Some(0));
    }

    #[test]
    fn test_parse_items_rejects_non_array() {
        assert!(parse_items(ResourceType::Review, json!("nope")).is_err());
        assert!(parse_items(ResourceType::Review, json!({ "items": [] })).unwrap().items.is_empty());
    }

    #[test]
    fn test_parse_items_sets_aside_bad_elements() {
        let payload = json!([
            { "id": 101, "mosque_id": 1, "rating": 4, "status": "pending" },
            { "id": 102, "mosque_id": 1, "rating": 4, "criteria": { "parking": 9 }, "status": "pending" },
            { "id": 103, "mosque_id": 1, "rating": 2, "criteria": { "parking": 0 }, "status": "pending" }
        ]);

        let page = parse_items(ResourceType::Review, payload).unwrap();

        let ids: Vec<i64> = page.items.iter().map(|item| item.raw_id()).collect();
        assert_eq!(ids, vec![101, 103]);
        assert_eq!(page.rejected.len(), 1);
        assert!(matches!(
            page.rejected[0],
            ValidationError::Malformed { resource: ResourceType::Review, .. }
        ));
    }
}
