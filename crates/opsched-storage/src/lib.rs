//! # opsched-storage
//!
//! Storage abstraction layer for the Opsched scheduler.
//!
//! This crate defines the traits and types that all storage backends must
//! implement. It does not contain any implementations - those are provided
//! by separate crates.
//!
//! ## Overview
//!
//! The main trait is [`ScheduleStore`], which defines the contract for:
//! - record creation and lookup
//! - atomic multi-field commits with optimistic versioning
//! - listing for reporting consumers
//!
//! [`DoctorStore`] is the analogous (much smaller) contract for the surgeon
//! roster.
//!
//! ## Example
//!
//! ```ignore
//! use opsched_storage::{ScheduleStore, StoreError};
//!
//! async fn get_schedule(
//!     store: &dyn ScheduleStore,
//!     id: &str,
//! ) -> Result<StoredSchedule, StoreError> {
//!     store
//!         .fetch(id)
//!         .await?
//!         .ok_or_else(|| StoreError::not_found(id))
//! }
//! ```

mod error;
mod traits;
mod types;

// Re-export everything from submodules
pub use error::{ErrorCategory, StoreError};
pub use traits::{DoctorStore, ScheduleStore};
pub use types::{DoctorUpdate, RESERVED_FIELDS, ScheduleUpdate, StoredSchedule};

/// Type alias for a storage result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for a boxed schedule store trait object.
pub type DynScheduleStore = std::sync::Arc<dyn ScheduleStore>;

/// Type alias for a boxed doctor store trait object.
pub type DynDoctorStore = std::sync::Arc<dyn DoctorStore>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use opsched_storage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ErrorCategory, StoreError};
    pub use crate::traits::{DoctorStore, ScheduleStore};
    pub use crate::types::{DoctorUpdate, RESERVED_FIELDS, ScheduleUpdate, StoredSchedule};
    pub use crate::{DynDoctorStore, DynScheduleStore, StoreResult};
}
