//! Error types for the Mosques API client.

use mosques_core::{TargetRef, ValidationError, WorkflowError};
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client errors.
///
/// `Clone` so a single in-flight fetch can hand the same failure to every
/// caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Connect failure, timeout, or a response that never arrived
    #[error("Network error: {message}")]
    Network { message: String, retryable: bool },

    /// Missing or expired credential. The session has already been cleared.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Local checks refused the payload; no request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The caller already confirmed this entity
    #[error("Already confirmed: {0}")]
    AlreadyConfirmed(TargetRef),

    /// The API does not serve this combination
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The caller's role does not allow the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Any other workflow refusal (e.g. confirming a settled entity)
    #[error(transparent)]
    Workflow(WorkflowError),

    /// Non-2xx response not covered above
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The view was cancelled while the request was in flight
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration error (missing base URL, bad timeout)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn network(message: impl Into<String>, retryable: bool) -> Self {
        ClientError::Network {
            message: message.into(),
            retryable,
        }
    }

    /// Whether trying again later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network { retryable, .. } => *retryable,
            ClientError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Auth(_) => Some(401),
            _ => None,
        }
    }
}

impl From<WorkflowError> for ClientError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::AlreadyConfirmed { target, .. } => ClientError::AlreadyConfirmed(target),
            WorkflowError::ConfirmationUnsupported { .. } | WorkflowError::UnsupportedFilter { .. } => {
                ClientError::Unsupported(err.to_string())
            }
            WorkflowError::AuthenticationRequired => ClientError::Auth(err.to_string()),
            WorkflowError::PermissionDenied { .. } => ClientError::Forbidden(err.to_string()),
            WorkflowError::NotPending { .. } => ClientError::Workflow(err),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let retryable = err.is_timeout() || err.is_connect() || err.is_request();
        ClientError::network(err.to_string(), retryable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosques_core::workflow::{Capability, Role};
    use mosques_core::{ResourceType, StatusFilter, UserId};

    #[test]
    fn test_workflow_errors_map_into_taxonomy() {
        let target = TargetRef::new(ResourceType::MosqueSuggestion, 45);

        let err: ClientError = WorkflowError::AlreadyConfirmed {
            user: UserId::new(7),
            target,
        }
        .into();
        assert!(matches!(err, ClientError::AlreadyConfirmed(t) if t == target));

        let err: ClientError = WorkflowError::UnsupportedFilter {
            resource: ResourceType::MosqueSuggestion,
            filter: StatusFilter::Rejected,
        }
        .into();
        assert!(matches!(err, ClientError::Unsupported(_)));

        let err: ClientError = WorkflowError::PermissionDenied {
            capability: Capability::DeleteRecords,
            role: Role::Moderator,
            required: Role::Admin,
        }
        .into();
        assert!(matches!(err, ClientError::Forbidden(_)));
    }

    #[test]
    fn test_retryable() {
        assert!(ClientError::network("timed out", true).is_retryable());
        assert!(ClientError::Api { status: 503, message: String::new() }.is_retryable());
        assert!(!ClientError::Api { status: 400, message: String::new() }.is_retryable());
        assert!(!ClientError::Auth("expired".into()).is_retryable());
    }
}
