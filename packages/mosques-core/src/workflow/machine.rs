//! Moderation state machine.
//!
//! Pure decision logic - NO IO. The machine checks capabilities, computes
//! transitions and keeps the per-session confirmation ledger. Callers apply
//! its decisions to their local copies and send the matching request; the
//! API's answer replaces whatever was projected here.
//!
//! Confirmations never change status. Whether enough of them auto-approve
//! an entity is the server's call and is not simulated.

use std::collections::HashSet;

use tracing::debug;

use super::{AccessPolicy, Actor, Capability, ModerationAction, RolePolicy, Transition};
use crate::error::WorkflowError;
use crate::id::UserId;
use crate::model::{ModerationStatus, ResourceType, TargetRef};

/// Anything with a moderation status.
pub trait Moderated {
    fn resource(&self) -> ResourceType;
    fn raw_id(&self) -> i64;
    fn status(&self) -> ModerationStatus;
    fn set_status(&mut self, status: ModerationStatus);

    fn target(&self) -> TargetRef {
        TargetRef::new(self.resource(), self.raw_id())
    }
}

/// Moderated entities the community can confirm.
pub trait Confirmable: Moderated {
    fn confirmations_count(&self) -> u32;
    fn increment_confirmations(&mut self);
}

/// Moderation state machine
pub struct ModerationMachine<P = RolePolicy> {
    policy: P,
    /// (user, target) pairs confirmed in this session
    confirmed: HashSet<(UserId, TargetRef)>,
}

impl ModerationMachine<RolePolicy> {
    pub fn new() -> Self {
        Self::with_policy(RolePolicy)
    }
}

impl Default for ModerationMachine<RolePolicy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: AccessPolicy> ModerationMachine<P> {
    pub fn with_policy(policy: P) -> Self {
        Self {
            policy,
            confirmed: HashSet::new(),
        }
    }

    /// Capability hook for an action, run before any request is issued.
    pub fn authorize(&self, actor: &Actor, action: ModerationAction) -> Result<(), WorkflowError> {
        actor.can(action.capability()).check(&self.policy)
    }

    pub fn approve<E: Moderated>(&self, actor: &Actor, entity: &mut E) -> Result<Transition, WorkflowError> {
        self.moderate(actor, entity, ModerationAction::Approve)
    }

    pub fn reject<E: Moderated>(&self, actor: &Actor, entity: &mut E) -> Result<Transition, WorkflowError> {
        self.moderate(actor, entity, ModerationAction::Reject)
    }

    /// Consumes the entity: after a delete there is nothing left to hold.
    pub fn delete<E: Moderated>(&self, actor: &Actor, entity: E) -> Result<Transition, WorkflowError> {
        self.authorize(actor, ModerationAction::Delete)?;
        let transition = entity.status().apply(ModerationAction::Delete);
        debug!(target_ref = %entity.target(), "Entity deleted");
        Ok(transition)
    }

    fn moderate<E: Moderated>(
        &self,
        actor: &Actor,
        entity: &mut E,
        action: ModerationAction,
    ) -> Result<Transition, WorkflowError> {
        self.authorize(actor, action)?;
        let transition = entity.status().apply(action);
        if let Some(to) = transition.to() {
            entity.set_status(to);
        }
        debug!(
            target_ref = %entity.target(),
            action = %action,
            ?transition,
            "Moderation transition"
        );
        Ok(transition)
    }

    /// Record one confirmation and bump the count by exactly one.
    ///
    /// Returns the new count. Status is left alone even when the count
    /// reaches the auto-approval threshold.
    pub fn confirm<E: Confirmable>(&mut self, actor: &Actor, entity: &mut E) -> Result<u32, WorkflowError> {
        let user = self.check_confirmable(actor, entity.target(), Some(entity.status()))?;
        entity.increment_confirmations();
        self.confirmed.insert((user, entity.target()));
        debug!(
            target_ref = %entity.target(),
            user = %user,
            count = entity.confirmations_count(),
            "Confirmation recorded"
        );
        Ok(entity.confirmations_count())
    }

    /// Everything [`confirm`](Self::confirm) checks, without touching state.
    ///
    /// `status` is the last known status, if any; the API stays the
    /// authority when it is unknown.
    pub fn check_confirmable(
        &self,
        actor: &Actor,
        target: TargetRef,
        status: Option<ModerationStatus>,
    ) -> Result<UserId, WorkflowError> {
        actor.can(Capability::ConfirmSubmissions).check(&self.policy)?;
        let user = actor.user_id().ok_or(WorkflowError::AuthenticationRequired)?;

        if !target.resource.supports_confirmation() {
            return Err(WorkflowError::ConfirmationUnsupported {
                resource: target.resource,
            });
        }
        if let Some(status) = status.filter(|s| !s.is_pending()) {
            return Err(WorkflowError::NotPending { target, status });
        }
        if self.confirmed.contains(&(user, target)) {
            return Err(WorkflowError::AlreadyConfirmed { user, target });
        }
        Ok(user)
    }

    /// Note a confirmation the API accepted (or reported as a duplicate).
    /// Returns false if it was already known.
    pub fn record_confirmation(&mut self, user: UserId, target: TargetRef) -> bool {
        self.confirmed.insert((user, target))
    }

    pub fn has_confirmed(&self, user: UserId, target: TargetRef) -> bool {
        self.confirmed.contains(&(user, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirmations::{is_near_threshold, DEFAULT_CONFIRMATION_THRESHOLD};
    use crate::model::{MosqueSuggestion, Review};
    use crate::workflow::Role;
    use serde_json::json;

    fn suggestion(status: &str, confirmations: u32) -> MosqueSuggestion {
        serde_json::from_value(json!({
            "id": 45,
            "arabic_name": "مسجد الرحمة",
            "type": "masjid",
            "governorate": "Sfax",
            "latitude": 34.74,
            "longitude": 10.76,
            "status": status,
            "confirmations_count": confirmations
        }))
        .unwrap()
    }

    fn moderator() -> Actor {
        Actor::new(Some(UserId::new(1)), Role::Moderator)
    }

    fn user(id: i64) -> Actor {
        Actor::new(Some(UserId::new(id)), Role::Authenticated)
    }

    #[test]
    fn test_approve_twice_is_idempotent() {
        let machine = ModerationMachine::new();
        let mut s = suggestion("pending_approval", 0);

        let first = machine.approve(&moderator(), &mut s).unwrap();
        let second = machine.approve(&moderator(), &mut s).unwrap();

        assert!(matches!(first, Transition::Changed { .. }));
        assert!(second.is_noop());
        assert_eq!(s.status, ModerationStatus::Approved);
    }

    #[test]
    fn test_reject_then_approve_is_reversal() {
        let machine = ModerationMachine::new();
        let mut s = suggestion("pending_approval", 0);

        machine.reject(&moderator(), &mut s).unwrap();
        assert_eq!(s.status, ModerationStatus::Rejected);

        let t = machine.approve(&moderator(), &mut s).unwrap();
        assert_eq!(
            t,
            Transition::Reversal {
                from: ModerationStatus::Rejected,
                to: ModerationStatus::Approved
            }
        );
        assert_eq!(s.status, ModerationStatus::Approved);
    }

    #[test]
    fn test_plain_user_cannot_moderate() {
        let machine = ModerationMachine::new();
        let mut s = suggestion("pending_approval", 0);

        let result = machine.approve(&user(9), &mut s);

        assert!(matches!(result, Err(WorkflowError::PermissionDenied { .. })));
        assert_eq!(s.status, ModerationStatus::PendingApproval);
    }

    #[test]
    fn test_delete_requires_admin() {
        let machine = ModerationMachine::new();
        let s = suggestion("rejected", 0);
        assert!(machine.delete(&moderator(), s.clone()).is_err());

        let admin = Actor::new(Some(UserId::new(1)), Role::Admin);
        assert_eq!(
            machine.delete(&admin, s).unwrap(),
            Transition::Removed {
                from: ModerationStatus::Rejected
            }
        );
    }

    #[test]
    fn test_double_confirm_counts_once() {
        let mut machine = ModerationMachine::new();
        let mut s = suggestion("pending_approval", 0);

        assert_eq!(machine.confirm(&user(7), &mut s).unwrap(), 1);
        let second = machine.confirm(&user(7), &mut s);

        assert!(matches!(second, Err(WorkflowError::AlreadyConfirmed { .. })));
        assert_eq!(s.confirmations_count, 1);

        // a different user still counts
        assert_eq!(machine.confirm(&user(8), &mut s).unwrap(), 2);
    }

    #[test]
    fn test_confirm_requires_pending() {
        let mut machine = ModerationMachine::new();
        let mut s = suggestion("approved", 4);

        let result = machine.confirm(&user(7), &mut s);

        assert!(matches!(result, Err(WorkflowError::NotPending { .. })));
        assert_eq!(s.confirmations_count, 4);
    }

    #[test]
    fn test_threshold_does_not_auto_approve() {
        let mut machine = ModerationMachine::new();
        let mut s = suggestion("pending_approval", 2);

        let count = machine.confirm(&user(3), &mut s).unwrap();

        assert_eq!(count, DEFAULT_CONFIRMATION_THRESHOLD);
        assert!(is_near_threshold(count, DEFAULT_CONFIRMATION_THRESHOLD));
        assert_eq!(s.status, ModerationStatus::PendingApproval);
    }

    #[test]
    fn test_reviews_are_not_confirmable() {
        let machine = ModerationMachine::new();
        let review: Review = serde_json::from_value(json!({
            "id": 101, "mosque_id": 1, "rating": 4, "status": "pending"
        }))
        .unwrap();

        let result = machine.check_confirmable(&user(7), review.target(), Some(review.status));

        assert_eq!(
            result,
            Err(WorkflowError::ConfirmationUnsupported {
                resource: ResourceType::Review
            })
        );
    }

    #[test]
    fn test_confirm_without_user_id_requires_authentication() {
        let machine = ModerationMachine::new();
        let actor = Actor::new(None, Role::Authenticated);
        let target = TargetRef::new(ResourceType::EditProposal, 23);

        assert_eq!(
            machine.check_confirmable(&actor, target, None),
            Err(WorkflowError::AuthenticationRequired)
        );
    }
}
