//! Client-side capability checks.
//!
//! Fluent API, run before any privileged request is built:
//!
//! ```rust
//! use mosques_core::workflow::{Actor, Capability, Role, RolePolicy};
//! use mosques_core::UserId;
//!
//! let actor = Actor::new(Some(UserId::new(1)), Role::Moderator);
//! assert!(actor.can(Capability::ModerateSubmissions).check(&RolePolicy).is_ok());
//! assert!(actor.can(Capability::DeleteRecords).check(&RolePolicy).is_err());
//! ```
//!
//! This is a fast-fail for the UI. The API re-checks every request.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, WorkflowError};
use crate::id::UserId;

/// Roles carried by the access token, lowest to highest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "user")]
    Authenticated,
    Moderator,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Authenticated => write!(f, "authenticated"),
            Role::Moderator => write!(f, "moderator"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "authenticated" | "user" => Ok(Role::Authenticated),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Attest that a pending suggestion or edit is accurate
    ConfirmSubmissions,

    /// Approve or reject suggestions, reviews and edits
    ModerateSubmissions,

    /// Hard-delete any moderated record
    DeleteRecords,
}

impl Capability {
    pub fn required_role(&self) -> Role {
        match self {
            Capability::ConfirmSubmissions => Role::Authenticated,
            Capability::ModerateSubmissions => Role::Moderator,
            Capability::DeleteRecords => Role::Admin,
        }
    }

    pub fn requires_admin(&self) -> bool {
        self.required_role() == Role::Admin
    }
}

/// Who is asking. Built from the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    user_id: Option<UserId>,
    role: Option<Role>,
}

impl Actor {
    pub fn new(user_id: Option<UserId>, role: Role) -> Self {
        Self {
            user_id,
            role: Some(role),
        }
    }

    /// No session at all.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            role: None,
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: Capability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor: self,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor: Actor,
    capability: Capability,
}

impl CapabilityBuilder {
    /// Perform the authorization check
    pub fn check<P>(self, policy: &P) -> Result<(), WorkflowError>
    where
        P: AccessPolicy + ?Sized,
    {
        policy.authorize(&self.actor, self.capability)
    }
}

/// Hook deciding whether an actor holds a capability.
pub trait AccessPolicy: Send + Sync {
    fn authorize(&self, actor: &Actor, capability: Capability) -> Result<(), WorkflowError>;
}

/// Default policy: the actor's role must reach the capability's required role.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl AccessPolicy for RolePolicy {
    fn authorize(&self, actor: &Actor, capability: Capability) -> Result<(), WorkflowError> {
        let Some(role) = actor.role else {
            return Err(WorkflowError::AuthenticationRequired);
        };
        let required = capability.required_role();
        if role < required {
            return Err(WorkflowError::PermissionDenied {
                capability,
                role,
                required,
            });
        }
        Ok(())
    }
}
