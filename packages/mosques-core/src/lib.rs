//! Resource model and moderation workflow for the Mosques TN directory.
//!
//! Everything in this crate is pure: no IO, no async. The remote API owns
//! every entity; the types here are typed copies of its payloads plus the
//! rules a client needs to drive moderation without guessing.
//!
//! - [`model`]: mosques, suggestions, reviews, edit proposals
//! - [`validation`]: payload parsing and local draft checks
//! - [`workflow`]: status transitions, confirmation ledger, capability checks
//! - [`confirmations`]: "close to auto-approval" hinting for the UI
//!
//! # Example
//!
//! ```rust
//! use mosques_core::workflow::{ModerationAction, Transition};
//! use mosques_core::ModerationStatus;
//!
//! let t = ModerationStatus::Rejected.apply(ModerationAction::Approve);
//! assert!(matches!(t, Transition::Reversal { .. }));
//! assert_eq!(t.to(), Some(ModerationStatus::Approved));
//! ```

pub mod confirmations;
pub mod error;
pub mod id;
pub mod model;
pub mod validation;
pub mod workflow;

pub use confirmations::{is_near_threshold, ThresholdHint, DEFAULT_CONFIRMATION_THRESHOLD};
pub use error::{ValidationError, WorkflowError};
pub use id::{EditId, Id, MosqueId, ReviewId, SuggestionId, UserId};
pub use model::{
    EditProposal, ModerationItem, ModerationStatus, Mosque, MosquePatch, MosqueSuggestion,
    MosqueType, ResourceType, Review, StatusFilter, TargetRef,
};
