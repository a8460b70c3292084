use opsched_storage::StoreError;
use thiserror::Error;

/// Errors surfaced by report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The requested range is empty or reversed.
    #[error("Invalid report range: {start}..{end}")]
    InvalidRange { start: String, end: String },

    /// Reading schedules from the store failed.
    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),
}

impl ReportError {
    pub fn invalid_range(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::InvalidRange {
            start: start.into(),
            end: end.into(),
        }
    }
}
