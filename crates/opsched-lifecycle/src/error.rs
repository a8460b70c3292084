use opsched_core::ScheduleStatus;
use opsched_storage::StoreError;
use thiserror::Error;

/// Errors surfaced by the transition operation.
///
/// None of these are retried automatically; the caller decides whether to
/// retry with corrected input. A `Persistence` conflict is safe to retry
/// wholesale because validation re-reads current state on every attempt.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The referenced schedule does not exist.
    #[error("Schedule not found: {id}")]
    NotFound { id: String },

    /// The requested edge is not in the transition graph and is not covered
    /// by the emergency-override rule.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: ScheduleStatus,
        to: ScheduleStatus,
    },

    /// An emergency transition was attempted without a non-empty reason.
    #[error("Reason is mandatory for emergency status")]
    MissingReason,

    /// The underlying fetch or commit failed.
    #[error("Persistence failure: {0}")]
    Persistence(#[source] StoreError),
}

impl TransitionError {
    /// Returns `true` if the failure came from the caller's input rather
    /// than from infrastructure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::InvalidTransition { .. } | Self::MissingReason
        )
    }

    /// Returns `true` if retrying the whole transition call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Persistence(err) => {
                err.is_version_conflict() || matches!(err, StoreError::Connection { .. })
            }
            _ => false,
        }
    }
}
