use std::sync::Arc;

use opsched_lifecycle::LifecycleManager;
use opsched_reports::ReportEngine;
use opsched_storage::{DynDoctorStore, DynScheduleStore};

/// Shared application state handed to every handler.
///
/// The lifecycle manager and report engine wrap the same schedule store, so
/// everything observes one consistent set of records.
#[derive(Clone)]
pub struct AppState {
    pub schedules: DynScheduleStore,
    pub doctors: DynDoctorStore,
    pub lifecycle: Arc<LifecycleManager>,
    pub reports: Arc<ReportEngine>,
}

impl AppState {
    /// Wires the in-memory backend.
    pub fn in_memory() -> Self {
        let schedules = opsched_db_memory::create_schedule_store();
        let doctors = opsched_db_memory::create_doctor_store();
        let lifecycle = Arc::new(LifecycleManager::new(Arc::clone(&schedules)));
        let reports = Arc::new(ReportEngine::new(Arc::clone(&schedules)));
        Self {
            schedules,
            doctors,
            lifecycle,
            reports,
        }
    }
}
