//! Moderation workflow: transitions, capability checks, confirmation ledger.

mod capability;
mod filters;
mod machine;
mod transition;

pub use capability::{AccessPolicy, Actor, Capability, CapabilityBuilder, Role, RolePolicy};
pub use filters::FilterSupport;
pub use machine::{Confirmable, Moderated, ModerationMachine};
pub use transition::{ModerationAction, Transition};
