//! Typed copies of the API's entities.

pub mod edit;
pub mod item;
pub mod mosque;
pub mod resource;
pub mod review;
pub mod status;
pub mod suggestion;
pub mod timestamp;

pub use edit::{EditProposal, MosquePatch, EDITABLE_FIELDS};
pub use item::ModerationItem;
pub use mosque::{
    Coordinates, Facilities, IqamaEntry, IqamaSchedule, MapMarker, Mosque, MosqueType,
    FACILITY_KEYS, PRAYER_KEYS,
};
pub use resource::{ResourceType, StatusFilter, TargetRef};
pub use review::{CriterionScore, Rating, Review, CRITERIA_KEYS};
pub use status::ModerationStatus;
pub use suggestion::{map_markers, MosqueSuggestion};
