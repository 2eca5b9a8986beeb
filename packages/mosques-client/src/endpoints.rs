//! URL paths, derived from the resource type.

use mosques_core::workflow::ModerationAction;
use mosques_core::{MosqueId, ResourceType};

pub const LOGIN: &str = "/auth/login";
pub const ME: &str = "/auth/me";
pub const MOSQUES: &str = "/mosques";
pub const NEARBY_MOSQUES: &str = "/mosques/nearby";
pub const SUGGESTIONS: &str = "/suggestions/mosques";
pub const FACILITIES: &str = "/meta/facilities";

/// `GET` list of a moderation queue.
pub fn moderation_list(resource: ResourceType) -> String {
    format!("/moderation/{}", resource.collection())
}

/// `POST` for approve/reject, `DELETE` for delete.
pub fn moderation_action(resource: ResourceType, id: i64, action: ModerationAction) -> String {
    match action.path_segment() {
        Some(segment) => format!("/moderation/{}/{}/{}", resource.collection(), id, segment),
        None => format!("/moderation/{}/{}", resource.collection(), id),
    }
}

/// `None` for collections the community cannot confirm.
pub fn confirmation(resource: ResourceType, id: i64) -> Option<String> {
    match resource {
        ResourceType::MosqueSuggestion => Some(format!("/suggestions/{}/confirmations", id)),
        ResourceType::EditProposal => Some(format!("/suggestions/edits/{}/confirmations", id)),
        ResourceType::Review => None,
    }
}

pub fn mosque(id: MosqueId) -> String {
    format!("/mosques/{}", id)
}

pub fn mosque_reviews(id: MosqueId) -> String {
    format!("/mosques/{}/reviews", id)
}

pub fn mosque_edits(id: MosqueId) -> String {
    format!("/suggestions/mosques/{}/edits", id)
}
