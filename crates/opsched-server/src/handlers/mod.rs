//! HTTP route handlers.
//!
//! Organized by resource:
//! - `system` - service banner and health probes
//! - `schedules` - schedule CRUD and the status transition operation
//! - `doctors` - surgeon roster CRUD
//! - `reports` - OT efficiency reports

pub mod doctors;
pub mod reports;
pub mod schedules;
pub mod system;
