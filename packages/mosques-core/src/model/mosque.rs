use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::id::MosqueId;

/// Facility keys the apps know how to render. The map itself stays open.
pub const FACILITY_KEYS: &[&str] = &[
    "women_section",
    "wudu",
    "men_bathrooms",
    "women_bathrooms",
    "parking",
    "accessibility",
    "ac",
    "library",
    "quran_school",
    "daily_prayers",
    "jumua_prayer",
    "morgue",
];

pub const PRAYER_KEYS: &[&str] = &["fajr", "dhuhr", "asr", "maghrib", "isha"];

// =============================================================================
// Mosque type
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MosqueType {
    #[serde(alias = "mosque", alias = "مسجد")]
    Masjid,
    #[serde(alias = "جامع")]
    Jami,
    #[serde(alias = "مصلى")]
    Musalla,
}

impl std::fmt::Display for MosqueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MosqueType::Masjid => write!(f, "masjid"),
            MosqueType::Jami => write!(f, "jami"),
            MosqueType::Musalla => write!(f, "musalla"),
        }
    }
}

impl std::str::FromStr for MosqueType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "masjid" | "mosque" | "مسجد" => Ok(MosqueType::Masjid),
            "jami" | "جامع" => Ok(MosqueType::Jami),
            "musalla" | "مصلى" => Ok(MosqueType::Musalla),
            other => Err(ValidationError::UnknownMosqueType(other.to_string())),
        }
    }
}

// =============================================================================
// Location
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        let in_range = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if !in_range {
            return Err(ValidationError::InvalidCoordinates { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    /// Pairs the API's separate nullable columns; both must be present.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Self::new(lat, lng).ok(),
            _ => None,
        }
    }
}

/// A point the map layer can draw.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub id: i64,
    pub title: String,
    pub coordinates: Coordinates,
}

// =============================================================================
// Open maps
// =============================================================================

/// Facility flags keyed by facility name. Unknown keys round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facilities(pub BTreeMap<String, bool>);

impl Facilities {
    pub fn has(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// Enabled facilities, in key order.
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|(_, on)| **on).map(|(k, _)| k.as_str())
    }

    /// Keys the apps do not know yet.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|k| !FACILITY_KEYS.contains(k))
    }
}

/// One prayer's iqama setting.
///
/// Newer payloads carry an offset in minutes after the adhan; older ones a
/// fixed `HH:MM` clock time. Both are kept as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IqamaEntry {
    OffsetMinutes(i32),
    Fixed(String),
}

/// Iqama settings keyed by prayer name. Unknown keys round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IqamaSchedule(pub BTreeMap<String, IqamaEntry>);

impl IqamaSchedule {
    pub fn offset_minutes(&self, prayer: &str) -> Option<i32> {
        match self.0.get(prayer)? {
            IqamaEntry::OffsetMinutes(m) => Some(*m),
            IqamaEntry::Fixed(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (prayer, entry) in &self.0 {
            if let IqamaEntry::Fixed(value) = entry {
                if !is_clock_time(value) {
                    return Err(ValidationError::InvalidTime {
                        field: format!("iqama_times.{}", prayer),
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// `HH:MM`, 24-hour clock.
pub fn is_clock_time(value: &str) -> bool {
    let value = value.trim();
    let Some((h, m)) = value.split_once(':') else {
        return false;
    };
    if h.len() != 2 || m.len() != 2 {
        return false;
    }
    match (h.parse::<u8>(), m.parse::<u8>()) {
        (Ok(h), Ok(m)) => h < 24 && m < 60,
        _ => false,
    }
}

// =============================================================================
// Mosque
// =============================================================================

/// An approved directory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mosque {
    pub id: MosqueId,
    pub arabic_name: Option<String>,
    #[serde(rename = "type")]
    pub mosque_type: Option<MosqueType>,
    pub governorate: String,
    pub delegation: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub facilities: Facilities,
    #[serde(default, rename = "iqama_times")]
    pub iqama: IqamaSchedule,
    pub jumuah_time: Option<String>,
    pub eid_info: Option<String>,
    pub muazzin_name: Option<String>,
    pub imam_5_prayers_name: Option<String>,
    pub imam_jumua_name: Option<String>,
    #[serde(default, deserialize_with = "super::timestamp::lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Mosque {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }

    pub fn display_name(&self) -> String {
        self.arabic_name
            .clone()
            .unwrap_or_else(|| format!("Mosque #{}", self.id))
    }
}
