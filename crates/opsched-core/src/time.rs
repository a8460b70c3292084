use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// UTC timestamp used on schedule records and transition history entries.
///
/// Serializes as an RFC 3339 string, which is the on-the-wire format shared
/// with the document store and reporting consumers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(pub OffsetDateTime);

impl UtcDateTime {
    pub fn new(datetime: OffsetDateTime) -> Self {
        Self(datetime)
    }

    pub fn inner(&self) -> &OffsetDateTime {
        &self.0
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn timestamp(&self) -> i64 {
        self.0.unix_timestamp()
    }
}

impl fmt::Display for UtcDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .0
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|_| fmt::Error)?;
        write!(f, "{formatted}")
    }
}

impl FromStr for UtcDateTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let datetime = OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339)
            .map_err(|e| {
                CoreError::invalid_date_time(format!("Failed to parse timestamp '{s}': {e}"))
            })?;
        Ok(UtcDateTime(datetime))
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = self
            .0
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UtcDateTime::from_str(&s).map_err(serde::de::Error::custom)
    }
}

pub fn now_utc() -> UtcDateTime {
    UtcDateTime(OffsetDateTime::now_utc())
}

pub fn from_unix_timestamp(timestamp: i64) -> Result<UtcDateTime> {
    let datetime = OffsetDateTime::from_unix_timestamp(timestamp).map_err(|e| {
        CoreError::invalid_date_time(format!("Invalid Unix timestamp {timestamp}: {e}"))
    })?;
    Ok(UtcDateTime(datetime))
}
