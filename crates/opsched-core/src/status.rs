use crate::time::{UtcDateTime, now_utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Lifecycle status of an operation schedule.
///
/// `Cancelled` and `Completed` are terminal: no outgoing transition is ever
/// valid from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Scheduled,
    InProgress,
    Postponed,
    Cancelled,
    Completed,
    Emergency,
}

impl ScheduleStatus {
    /// All status values, in declaration order.
    pub const ALL: [ScheduleStatus; 6] = [
        ScheduleStatus::Scheduled,
        ScheduleStatus::InProgress,
        ScheduleStatus::Postponed,
        ScheduleStatus::Cancelled,
        ScheduleStatus::Completed,
        ScheduleStatus::Emergency,
    ];

    /// The primary transition table: statuses directly reachable from `self`.
    ///
    /// This is the single authoritative edge list. The emergency override is
    /// deliberately NOT folded into it; see [`ScheduleStatus::is_emergency_override`].
    pub fn allowed_targets(self) -> &'static [ScheduleStatus] {
        match self {
            ScheduleStatus::Scheduled => &[
                ScheduleStatus::InProgress,
                ScheduleStatus::Postponed,
                ScheduleStatus::Cancelled,
                ScheduleStatus::Emergency,
            ],
            ScheduleStatus::Emergency => &[ScheduleStatus::InProgress],
            ScheduleStatus::InProgress => &[ScheduleStatus::Completed],
            ScheduleStatus::Postponed => &[ScheduleStatus::Scheduled],
            ScheduleStatus::Cancelled | ScheduleStatus::Completed => &[],
        }
    }

    /// Whether `target` is directly reachable from `self` per the primary table.
    pub fn allows(self, target: ScheduleStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Secondary allow-rule for emergency escalation, evaluated only after the
    /// primary table lookup has rejected the transition: a move to `Emergency`
    /// is permitted from `Scheduled` or `Postponed` regardless of the table.
    pub fn is_emergency_override(from: ScheduleStatus, to: ScheduleStatus) -> bool {
        to == ScheduleStatus::Emergency
            && matches!(
                from,
                ScheduleStatus::Scheduled | ScheduleStatus::Postponed
            )
    }

    /// Terminal statuses have no outgoing edges.
    pub fn is_terminal(self) -> bool {
        matches!(self, ScheduleStatus::Cancelled | ScheduleStatus::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "scheduled",
            ScheduleStatus::InProgress => "in_progress",
            ScheduleStatus::Postponed => "postponed",
            ScheduleStatus::Cancelled => "cancelled",
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::Emergency => "emergency",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(ScheduleStatus::Scheduled),
            "in_progress" => Ok(ScheduleStatus::InProgress),
            "postponed" => Ok(ScheduleStatus::Postponed),
            "cancelled" => Ok(ScheduleStatus::Cancelled),
            "completed" => Ok(ScheduleStatus::Completed),
            "emergency" => Ok(ScheduleStatus::Emergency),
            other => Err(CoreError::invalid_status(other)),
        }
    }
}

/// One accepted transition in a schedule's audit trail.
///
/// Entries are immutable values; `statusHistory` is append-only and never
/// truncated or reordered. The timestamp is captured when the transition is
/// accepted, not when the write commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEntry {
    #[serde(rename = "fromStatus")]
    pub from_status: ScheduleStatus,
    #[serde(rename = "toStatus")]
    pub to_status: ScheduleStatus,
    #[serde(rename = "changedBy")]
    pub changed_by: String,
    #[serde(default)]
    pub reason: String,
    pub timestamp: UtcDateTime,
}

impl TransitionEntry {
    pub fn new(
        from_status: ScheduleStatus,
        to_status: ScheduleStatus,
        changed_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            from_status,
            to_status,
            changed_by: changed_by.into(),
            reason: reason.into(),
            timestamp: now_utc(),
        }
    }
}
