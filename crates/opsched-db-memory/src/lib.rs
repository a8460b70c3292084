//! In-memory storage backend for the Opsched scheduler.
//!
//! This crate provides in-memory implementations of the `ScheduleStore` and
//! `DoctorStore` traits from `opsched-storage`, backed by `dashmap` for
//! concurrent access. Commits are applied under the record's map-entry
//! guard, so the version-check-then-apply step is linearizable per record.
//!
//! # Example
//!
//! ```ignore
//! use opsched_db_memory::InMemoryScheduleStore;
//! use opsched_storage::ScheduleStore;
//!
//! let store = InMemoryScheduleStore::new();
//! let created = store.create(schedule).await?;
//! ```

mod doctors;
mod store;

// Re-export the storage traits for convenience
pub use opsched_storage::{DoctorStore, ScheduleStore, StoreError, StoredSchedule};

pub use doctors::InMemoryDoctorStore;
pub use store::InMemoryScheduleStore;

use opsched_storage::{DynDoctorStore, DynScheduleStore};

/// Creates a new in-memory `ScheduleStore` instance.
pub fn create_schedule_store() -> DynScheduleStore {
    std::sync::Arc::new(InMemoryScheduleStore::new())
}

/// Creates a new in-memory `DoctorStore` instance.
pub fn create_doctor_store() -> DynDoctorStore {
    std::sync::Arc::new(InMemoryDoctorStore::new())
}
