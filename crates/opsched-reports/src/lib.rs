//! # opsched-reports
//!
//! Admin efficiency reports over scheduled operation data.
//!
//! All reports are read-only aggregations: fetch the schedules whose
//! `operationDate` falls in a date range, bucket by key, count. They consume
//! the `status`, `statusHistory` and `doctorRemarks` fields maintained by the
//! lifecycle manager but never write them.

mod engine;
mod error;
mod range;

pub use engine::{
    OtUtilizationReport, ReportEngine, ResourceDemandReport, ScheduleVolatilityReport,
    SurgeryDistributionReport,
};
pub use error::ReportError;
pub use range::DateRange;
