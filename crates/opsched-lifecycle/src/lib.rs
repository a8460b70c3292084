//! # opsched-lifecycle
//!
//! The schedule status lifecycle manager: the one component that owns the
//! `status` field and audit trail of schedule records.
//!
//! A schedule moves through a fixed graph of statuses (`scheduled`,
//! `in_progress`, `postponed`, `cancelled`, `completed`, `emergency`), with
//! every accepted change appended to its `statusHistory`. Emergency
//! escalation bypasses the normal adjacency rule but requires a reason,
//! which is also mirrored into the record's `doctorRemarks`.
//!
//! ```ignore
//! use opsched_lifecycle::LifecycleManager;
//! use opsched_core::ScheduleStatus;
//!
//! let lifecycle = LifecycleManager::new(store);
//! lifecycle
//!     .transition(&id, ScheduleStatus::InProgress, "drAlice", "")
//!     .await?;
//! ```

mod error;
mod manager;

pub use error::TransitionError;
pub use manager::LifecycleManager;
