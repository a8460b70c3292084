//! Storage types for the persistence abstraction layer.

use opsched_core::{Schedule, ScheduleStatus, TransitionEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// A schedule record together with its storage version.
///
/// The version increases monotonically on every committed write and is the
/// token for optimistic concurrency: a commit that carries the version the
/// caller read is rejected with `VersionConflict` if another write landed in
/// between.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSchedule {
    /// Storage version of this record.
    pub version: u64,
    /// The record content.
    pub schedule: Schedule,
}

impl StoredSchedule {
    /// Creates a new `StoredSchedule`.
    #[must_use]
    pub fn new(version: u64, schedule: Schedule) -> Self {
        Self { version, schedule }
    }
}

/// Fields the lifecycle manager owns. Generic set-field updates touching any
/// of these are rejected: a direct write would bypass transition validation
/// and corrupt the audit trail.
pub const RESERVED_FIELDS: &[&str] = &[
    "id",
    "status",
    "statusHistory",
    "doctorRemarks",
    "createdAt",
    "updatedAt",
];

/// Describes a single atomic record update.
///
/// All requested operations are applied together in one commit, or not at
/// all. Three shapes are supported, mirroring the document store's update
/// primitives:
///
/// - set the `status` field (lifecycle manager only),
/// - append entries to `statusHistory` (append-to-list; existing entries are
///   never replaced or reordered),
/// - append a line to `doctorRemarks` (newline-separated below any existing
///   text),
/// - set arbitrary non-reserved fields (the CRUD merge path).
#[derive(Debug, Clone, Default)]
pub struct ScheduleUpdate {
    /// New value for the `status` field, if the update changes it.
    pub status: Option<ScheduleStatus>,
    /// Entries to append to `statusHistory`, in order.
    pub push_history: Vec<TransitionEntry>,
    /// Text to append to `doctorRemarks` on its own line.
    pub append_remarks: Option<String>,
    /// Generic set-field operations, keyed by wire field name.
    pub set_fields: serde_json::Map<String, Value>,
}

impl ScheduleUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `status` field.
    #[must_use]
    pub fn with_status(mut self, status: ScheduleStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Appends a transition entry to `statusHistory`.
    #[must_use]
    pub fn push_history(mut self, entry: TransitionEntry) -> Self {
        self.push_history.push(entry);
        self
    }

    /// Appends a line to `doctorRemarks`.
    #[must_use]
    pub fn append_remarks(mut self, text: impl Into<String>) -> Self {
        self.append_remarks = Some(text.into());
        self
    }

    /// Adds a generic set-field operation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidUpdate` if `field` is one of the reserved
    /// lifecycle-owned fields.
    pub fn set_field(
        mut self,
        field: impl Into<String>,
        value: Value,
    ) -> Result<Self, StoreError> {
        let field = field.into();
        if RESERVED_FIELDS.contains(&field.as_str()) {
            return Err(StoreError::invalid_update(format!(
                "field '{field}' is managed by the lifecycle and cannot be set directly"
            )));
        }
        self.set_fields.insert(field, value);
        Ok(self)
    }

    /// Returns `true` if this update carries no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.push_history.is_empty()
            && self.append_remarks.is_none()
            && self.set_fields.is_empty()
    }

    /// Re-checks the reserved-field invariant. Backends call this before
    /// applying an update built by hand rather than through the builder.
    pub fn validate(&self) -> Result<(), StoreError> {
        for field in self.set_fields.keys() {
            if RESERVED_FIELDS.contains(&field.as_str()) {
                return Err(StoreError::invalid_update(format!(
                    "field '{field}' is managed by the lifecycle and cannot be set directly"
                )));
            }
        }
        Ok(())
    }
}

/// Partial update for a doctor roster entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl DoctorUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.specialization.is_none() && self.phone.is_none()
    }
}
