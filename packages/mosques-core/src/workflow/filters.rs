use std::collections::HashSet;

use crate::error::WorkflowError;
use crate::model::{ResourceType, StatusFilter};

/// Which (collection, status filter) pairs the API can list.
///
/// The suggestions collection only serves its pending queue; asking it for
/// history is reported as unsupported instead of being answered with `[]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSupport {
    allowed: HashSet<(ResourceType, StatusFilter)>,
}

impl Default for FilterSupport {
    fn default() -> Self {
        let mut allowed = HashSet::new();
        allowed.insert((ResourceType::MosqueSuggestion, StatusFilter::Pending));
        for resource in [ResourceType::Review, ResourceType::EditProposal] {
            for filter in [
                StatusFilter::Pending,
                StatusFilter::Approved,
                StatusFilter::Rejected,
                StatusFilter::All,
            ] {
                allowed.insert((resource, filter));
            }
        }
        Self { allowed }
    }
}

impl FilterSupport {
    /// Mark a pair as served, e.g. once the API grows suggestion history.
    pub fn allow(mut self, resource: ResourceType, filter: StatusFilter) -> Self {
        self.allowed.insert((resource, filter));
        self
    }

    pub fn supports(&self, resource: ResourceType, filter: StatusFilter) -> bool {
        self.allowed.contains(&(resource, filter))
    }

    pub fn check(&self, resource: ResourceType, filter: StatusFilter) -> Result<(), WorkflowError> {
        if self.supports(resource, filter) {
            Ok(())
        } else {
            Err(WorkflowError::UnsupportedFilter { resource, filter })
        }
    }
}
