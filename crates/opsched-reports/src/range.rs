use time::macros::format_description;

use crate::error::ReportError;

/// Inclusive date range over the day component of `operationDate`.
///
/// Bounds and record dates are `YYYY-MM-DD` strings compared
/// lexicographically, which orders correctly for ISO dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self, ReportError> {
        let range = Self {
            start: start.into(),
            end: end.into(),
        };
        if range.start.is_empty() || range.end.is_empty() || range.start > range.end {
            return Err(ReportError::invalid_range(range.start, range.end));
        }
        Ok(range)
    }

    /// Whether the day component of `operation_date` falls inside the range.
    /// Records without a date never match.
    pub fn contains(&self, operation_date: &str) -> bool {
        let day = day_component(operation_date);
        !day.is_empty() && day >= self.start.as_str() && day <= self.end.as_str()
    }
}

pub(crate) fn day_component(operation_date: &str) -> &str {
    operation_date.split('T').next().unwrap_or("")
}

/// ISO-8601 week key for a `YYYY-MM-DD` day, formatted `YYYY-Www` with the
/// ISO week-based year. Returns `None` when the day does not parse.
pub(crate) fn iso_week_key(day: &str) -> Option<String> {
    let date = time::Date::parse(day, format_description!("[year]-[month]-[day]")).ok()?;
    let (year, week, _) = date.to_iso_week_date();
    Some(format!("{year}-W{week}"))
}
