//! Storage traits for the persistence abstraction layer.
//!
//! This module defines the contracts that all storage backends must
//! implement. Implementations must be thread-safe (`Send + Sync`).

use async_trait::async_trait;

use opsched_core::{Doctor, Schedule};

use crate::error::StoreError;
use crate::types::{DoctorUpdate, ScheduleUpdate, StoredSchedule};

/// Persistence contract for schedule records.
///
/// The central primitive is [`ScheduleStore::commit`]: a single-record update
/// that applies every operation in a [`ScheduleUpdate`] atomically: no other
/// commit on the same record may observe or interleave with a partially
/// applied update. Combined with the version token on [`StoredSchedule`],
/// this lets callers run an optimistic read-validate-commit loop without lost
/// updates.
///
/// # Example
///
/// ```ignore
/// use opsched_storage::{ScheduleStore, StoreError, ScheduleUpdate};
///
/// async fn rename_theater(
///     store: &dyn ScheduleStore,
///     id: &str,
/// ) -> Result<(), StoreError> {
///     let update = ScheduleUpdate::new().set_field("operatingTheater", "OT-3".into())?;
///     store.commit(id, update, None).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Creates a new schedule record.
    ///
    /// If `schedule.id` is empty, the backend assigns one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if a record with the same id
    /// exists.
    async fn create(&self, schedule: Schedule) -> Result<StoredSchedule, StoreError>;

    /// Reads a record by id.
    ///
    /// Returns `None` if the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing
    /// records.
    async fn fetch(&self, id: &str) -> Result<Option<StoredSchedule>, StoreError>;

    /// Applies an update to a record atomically and bumps its version.
    ///
    /// If `expected_version` is provided, the commit only succeeds when the
    /// stored version still matches; otherwise it fails with
    /// `VersionConflict` and nothing is applied. The backend sets `updatedAt`
    /// on every successful commit.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record does not exist.
    /// Returns `StoreError::VersionConflict` on a stale `expected_version`.
    /// Returns `StoreError::InvalidUpdate` if the update touches reserved
    /// fields through the generic set-field path or is otherwise malformed.
    async fn commit(
        &self,
        id: &str,
        update: ScheduleUpdate,
        expected_version: Option<u64>,
    ) -> Result<StoredSchedule, StoreError>;

    /// Deletes a record by id. Deleting an absent record is a no-op.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Lists all records, newest first (by `createdAt`).
    async fn list(&self) -> Result<Vec<StoredSchedule>, StoreError>;

    /// Lists the records registered by a user, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<StoredSchedule>, StoreError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// Persistence contract for the doctor roster.
#[async_trait]
pub trait DoctorStore: Send + Sync {
    /// Adds a roster entry. If `doctor.id` is empty, the backend assigns one.
    async fn create(&self, doctor: Doctor) -> Result<Doctor, StoreError>;

    /// Reads a roster entry by id. Returns `None` if absent.
    async fn fetch(&self, id: &str) -> Result<Option<Doctor>, StoreError>;

    /// Applies a partial update and bumps `updatedAt`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the entry does not exist.
    async fn update(&self, id: &str, update: DoctorUpdate) -> Result<Doctor, StoreError>;

    /// Removes a roster entry. Removing an absent entry is a no-op.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Lists the roster, newest first (by `createdAt`).
    async fn list(&self) -> Result<Vec<Doctor>, StoreError>;
}
