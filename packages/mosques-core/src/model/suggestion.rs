use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mosque::{Coordinates, Facilities, IqamaSchedule, MapMarker, MosqueType};
use super::{ModerationStatus, ResourceType};
use crate::id::SuggestionId;
use crate::workflow::{Confirmable, Moderated};

/// A user-submitted candidate mosque awaiting moderation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MosqueSuggestion {
    pub id: SuggestionId,
    pub arabic_name: Option<String>,
    #[serde(rename = "type")]
    pub mosque_type: Option<MosqueType>,
    pub governorate: String,
    pub delegation: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,

    // Location (both columns nullable on the server)
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    #[serde(default)]
    pub facilities: Facilities,
    #[serde(default, rename = "iqama_times")]
    pub iqama: IqamaSchedule,
    pub jumuah_time: Option<String>,
    pub image_url: Option<String>,

    pub status: ModerationStatus,
    #[serde(default)]
    pub confirmations_count: u32,
    #[serde(default, deserialize_with = "super::timestamp::lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl MosqueSuggestion {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }

    /// False when lat/lng are missing or out of range. Such suggestions stay
    /// in list views; the map layer skips them.
    pub fn is_mappable(&self) -> bool {
        self.coordinates().is_some()
    }

    pub fn display_name(&self) -> String {
        self.arabic_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Suggestion #{}", self.id))
    }

    pub fn map_marker(&self) -> Option<MapMarker> {
        Some(MapMarker {
            id: self.id.get(),
            title: self.display_name(),
            coordinates: self.coordinates()?,
        })
    }
}

/// Markers for the mappable subset, in input order.
pub fn map_markers(suggestions: &[MosqueSuggestion]) -> Vec<MapMarker> {
    suggestions.iter().filter_map(MosqueSuggestion::map_marker).collect()
}

impl Moderated for MosqueSuggestion {
    fn resource(&self) -> ResourceType {
        ResourceType::MosqueSuggestion
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

impl Confirmable for MosqueSuggestion {
    fn confirmations_count(&self) -> u32 {
        self.confirmations_count
    }

    fn increment_confirmations(&mut self) {
        self.confirmations_count += 1;
    }
}
