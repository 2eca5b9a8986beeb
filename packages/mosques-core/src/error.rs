//! Error types for the resource model and the workflow engine.

use thiserror::Error;

use crate::model::{ModerationStatus, ResourceType, StatusFilter, TargetRef};
use crate::workflow::{Capability, Role};
use crate::id::UserId;

/// A payload or draft that cannot enter workflow logic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{field} must be between {min} and 5, got {value}")]
    RatingOutOfRange { field: String, value: i64, min: i64 },

    #[error("Coordinates out of range: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Edit patch is empty")]
    EmptyPatch,

    #[error("Field is not editable: {0}")]
    FieldNotEditable(String),

    #[error("Invalid time for {field}: {value:?} (expected HH:MM)")]
    InvalidTime { field: String, value: String },

    #[error("Invalid moderation status: {0}")]
    UnknownStatus(String),

    #[error("Invalid mosque type: {0}")]
    UnknownMosqueType(String),

    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Malformed {resource} payload: {message}")]
    Malformed {
        resource: ResourceType,
        message: String,
    },

    /// A directory response (mosques, public reviews, facilities) that does
    /// not fit its type
    #[error("Malformed response payload: {0}")]
    MalformedPayload(String),
}

/// A workflow rule refused the requested transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("{target} is {status}; only pending entities accept confirmations")]
    NotPending {
        target: TargetRef,
        status: ModerationStatus,
    },

    #[error("User {user} already confirmed {target}")]
    AlreadyConfirmed { user: UserId, target: TargetRef },

    #[error("{resource} does not support confirmations")]
    ConfirmationUnsupported { resource: ResourceType },

    #[error("Listing {resource} by status '{filter}' is not supported by the API")]
    UnsupportedFilter {
        resource: ResourceType,
        filter: StatusFilter,
    },

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Permission denied: {capability:?} requires {required}, caller is {role}")]
    PermissionDenied {
        capability: Capability,
        role: Role,
        required: Role,
    },
}
