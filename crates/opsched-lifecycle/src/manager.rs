use opsched_core::{ScheduleStatus, TransitionEntry};
use opsched_storage::{DynScheduleStore, ScheduleStore, ScheduleUpdate, StoreError};

use crate::error::TransitionError;

/// Upper bound on optimistic commit attempts per transition call. When the
/// record keeps moving under us past this point, the conflict is surfaced to
/// the caller instead.
const MAX_COMMIT_ATTEMPTS: u32 = 5;

/// Owns the `status` and `statusHistory` fields of schedule records and
/// enforces the transition graph.
///
/// Every transition is a read-validate-commit cycle against a single record.
/// The commit carries the version observed at read time; if another
/// transition landed in between, the cycle restarts against fresh state, so
/// two racing calls serialize instead of silently overwriting each other's
/// history entries.
pub struct LifecycleManager {
    store: DynScheduleStore,
}

impl LifecycleManager {
    pub fn new(store: DynScheduleStore) -> Self {
        Self { store }
    }

    /// Moves a schedule to `new_status`, recording the change in its audit
    /// trail.
    ///
    /// Validation order: existence, transition graph (primary table, then
    /// the emergency-override rule), mandatory reason for the emergency
    /// target. On success exactly one `TransitionEntry` is appended to
    /// `statusHistory`, and an emergency reason is mirrored into
    /// `doctorRemarks` below any existing text.
    ///
    /// # Errors
    ///
    /// See [`TransitionError`]. Failures are logged with full context and
    /// never swallowed.
    pub async fn transition(
        &self,
        schedule_id: &str,
        new_status: ScheduleStatus,
        actor: &str,
        reason: &str,
    ) -> Result<(), TransitionError> {
        let mut attempts = 0;
        loop {
            attempts += 1;

            let stored = self
                .store
                .fetch(schedule_id)
                .await
                .map_err(TransitionError::Persistence)?
                .ok_or_else(|| {
                    tracing::error!(schedule_id, "schedule not found for status transition");
                    TransitionError::NotFound {
                        id: schedule_id.to_string(),
                    }
                })?;
            let old_status = stored.schedule.status;

            // Primary table lookup first; the emergency override is a
            // secondary rule consulted only on rejection.
            if !old_status.allows(new_status)
                && !ScheduleStatus::is_emergency_override(old_status, new_status)
            {
                tracing::error!(
                    schedule_id,
                    old_status = %old_status,
                    new_status = %new_status,
                    "invalid status transition"
                );
                return Err(TransitionError::InvalidTransition {
                    from: old_status,
                    to: new_status,
                });
            }

            if new_status == ScheduleStatus::Emergency && reason.trim().is_empty() {
                tracing::error!(
                    schedule_id,
                    old_status = %old_status,
                    actor,
                    "emergency transition rejected: reason is mandatory"
                );
                return Err(TransitionError::MissingReason);
            }

            let entry = TransitionEntry::new(old_status, new_status, actor, reason);
            let timestamp = entry.timestamp.clone();

            let mut update = ScheduleUpdate::new()
                .with_status(new_status)
                .push_history(entry);
            if new_status == ScheduleStatus::Emergency {
                update = update.append_remarks(format!("[EMERGENCY]: {reason}"));
            }

            match self
                .store
                .commit(schedule_id, update, Some(stored.version))
                .await
            {
                Ok(_) => {
                    tracing::info!(
                        schedule_id,
                        transition = %format!("{old_status} -> {new_status}"),
                        actor,
                        timestamp = %timestamp,
                        "status transition committed"
                    );
                    return Ok(());
                }
                Err(err) if err.is_version_conflict() && attempts < MAX_COMMIT_ATTEMPTS => {
                    // Another transition landed first; revalidate against the
                    // fresh record.
                    tracing::debug!(
                        schedule_id,
                        attempts,
                        "commit conflicted with a concurrent transition, retrying"
                    );
                    continue;
                }
                Err(StoreError::NotFound { .. }) => {
                    // Deleted between fetch and commit.
                    tracing::error!(schedule_id, "schedule vanished during status transition");
                    return Err(TransitionError::NotFound {
                        id: schedule_id.to_string(),
                    });
                }
                Err(err) => {
                    tracing::error!(
                        schedule_id,
                        old_status = %old_status,
                        new_status = %new_status,
                        error = %err,
                        "status transition commit failed"
                    );
                    return Err(TransitionError::Persistence(err));
                }
            }
        }
    }
}
