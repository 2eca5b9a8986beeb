use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mosque::{is_clock_time, Facilities, IqamaSchedule, Mosque};
use super::{ModerationStatus, ResourceType};
use crate::error::ValidationError;
use crate::id::{EditId, MosqueId};
use crate::workflow::{Confirmable, Moderated};

/// Mosque fields a community edit may touch.
pub const EDITABLE_FIELDS: &[&str] = &[
    "address",
    "facilities",
    "iqama_times",
    "jumuah_time",
    "eid_info",
    "image_url",
    "muazzin_name",
    "imam_5_prayers_name",
    "imam_jumua_name",
];

/// A partial update to an approved mosque.
///
/// Only allowlisted keys deserialize; anything else is a payload error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MosquePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facilities: Option<Facilities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iqama_times: Option<IqamaSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jumuah_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eid_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muazzin_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imam_5_prayers_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imam_jumua_name: Option<String>,
}

impl MosquePatch {
    /// Names of the fields this patch sets, in allowlist order.
    pub fn keys(&self) -> Vec<&'static str> {
        let present = [
            self.address.is_some(),
            self.facilities.is_some(),
            self.iqama_times.is_some(),
            self.jumuah_time.is_some(),
            self.eid_info.is_some(),
            self.image_url.is_some(),
            self.muazzin_name.is_some(),
            self.imam_5_prayers_name.is_some(),
            self.imam_jumua_name.is_some(),
        ];
        EDITABLE_FIELDS
            .iter()
            .zip(present)
            .filter_map(|(name, set)| set.then_some(*name))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(time) = &self.jumuah_time {
            if !is_clock_time(time) {
                return Err(ValidationError::InvalidTime {
                    field: "jumuah_time".to_string(),
                    value: time.clone(),
                });
            }
        }
        if let Some(iqama) = &self.iqama_times {
            iqama.validate()?;
        }
        Ok(())
    }

    /// Partial merge: only the fields set in the patch change. Applying the
    /// same patch twice leaves the mosque as after the first application.
    pub fn apply(&self, mosque: &mut Mosque) {
        if let Some(v) = &self.address {
            mosque.address = Some(v.clone());
        }
        if let Some(v) = &self.facilities {
            mosque.facilities = v.clone();
        }
        if let Some(v) = &self.iqama_times {
            mosque.iqama = v.clone();
        }
        if let Some(v) = &self.jumuah_time {
            mosque.jumuah_time = Some(v.trim().to_string());
        }
        if let Some(v) = &self.eid_info {
            mosque.eid_info = Some(v.clone());
        }
        if let Some(v) = &self.image_url {
            mosque.image_url = Some(v.clone());
        }
        if let Some(v) = &self.muazzin_name {
            mosque.muazzin_name = Some(v.clone());
        }
        if let Some(v) = &self.imam_5_prayers_name {
            mosque.imam_5_prayers_name = Some(v.clone());
        }
        if let Some(v) = &self.imam_jumua_name {
            mosque.imam_jumua_name = Some(v.clone());
        }
    }
}

/// A community-proposed patch to an approved mosque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditProposal {
    pub id: EditId,
    pub mosque_id: MosqueId,
    pub patch: MosquePatch,
    #[serde(default)]
    pub confirmations_count: u32,
    pub status: ModerationStatus,
    #[serde(default, deserialize_with = "super::timestamp::lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl EditProposal {
    pub fn summary(&self) -> String {
        let n = self.patch.keys().len();
        format!(
            "Edit for mosque #{}: {} field{} changed",
            self.mosque_id,
            n,
            if n == 1 { "" } else { "s" }
        )
    }
}

impl Moderated for EditProposal {
    fn resource(&self) -> ResourceType {
        ResourceType::EditProposal
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

impl Confirmable for EditProposal {
    fn confirmations_count(&self) -> u32 {
        self.confirmations_count
    }

    fn increment_confirmations(&mut self) {
        self.confirmations_count += 1;
    }
}
