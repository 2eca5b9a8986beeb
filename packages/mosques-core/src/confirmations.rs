//! Confirmation counts, for display.
//!
//! Nothing here changes a status. The server decides when enough
//! confirmations auto-approve an entity; the client only words the hint.

use crate::workflow::Confirmable;

/// Confirmations the server needs before it auto-approves.
pub const DEFAULT_CONFIRMATION_THRESHOLD: u32 = 3;

/// True once a single further confirmation would reach the threshold.
pub fn is_near_threshold(count: u32, threshold: u32) -> bool {
    count >= threshold.saturating_sub(1)
}

/// How far a pending entity is from auto-approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdHint {
    Collecting { remaining: u32 },
    NearThreshold { remaining: u32 },
    /// Count reached; still pending until the server acts.
    ThresholdReached,
}

impl ThresholdHint {
    pub fn for_count(count: u32, threshold: u32) -> Self {
        let remaining = threshold.saturating_sub(count);
        if remaining == 0 {
            ThresholdHint::ThresholdReached
        } else if is_near_threshold(count, threshold) {
            ThresholdHint::NearThreshold { remaining }
        } else {
            ThresholdHint::Collecting { remaining }
        }
    }

    /// `None` for entities that no longer collect confirmations.
    pub fn for_entity<E: Confirmable>(entity: &E, threshold: u32) -> Option<Self> {
        entity
            .status()
            .is_pending()
            .then(|| Self::for_count(entity.confirmations_count(), threshold))
    }
}

impl std::fmt::Display for ThresholdHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdHint::Collecting { remaining } => {
                write!(f, "{} more confirmations needed", remaining)
            }
            ThresholdHint::NearThreshold { .. } => write!(f, "one confirmation away"),
            ThresholdHint::ThresholdReached => write!(f, "awaiting server approval"),
        }
    }
}
