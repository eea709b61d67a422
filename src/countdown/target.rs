use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Date-time layouts with an explicit offset.
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Date-time layouts without an offset; these are read as local time.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid countdown target {raw:?}")]
pub struct InvalidTarget {
    pub raw: String,
}

/// Fixed instant a countdown display measures against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTarget {
    at: DateTime<Utc>,
}

impl CountdownTarget {
    pub fn at(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    #[cfg(test)]
    pub fn from_epoch_millis(ms: i64) -> Result<Self, InvalidTarget> {
        DateTime::from_timestamp_millis(ms)
            .map(Self::at)
            .ok_or_else(|| InvalidTarget { raw: ms.to_string() })
    }

    /// Parse a timestamp the way the dashboard templates emit them.
    ///
    /// Accepts RFC 3339 and ISO 8601 date-times with an offset, date-times
    /// without an offset (local time), and bare dates (UTC midnight).
    pub fn parse(raw: &str) -> Result<Self, InvalidTarget> {
        let s = raw.trim();
        let invalid = || InvalidTarget { raw: raw.to_string() };
        if s.is_empty() {
            return Err(invalid());
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::at(dt.with_timezone(&Utc)));
        }
        for layout in ZONED_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, layout) {
                return Ok(Self::at(dt.with_timezone(&Utc)));
            }
        }
        for layout in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
                // None inside a DST gap
                return Local
                    .from_local_datetime(&naive)
                    .earliest()
                    .map(|dt| Self::at(dt.with_timezone(&Utc)))
                    .ok_or_else(invalid);
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Self::at(naive.and_utc()))
                .ok_or_else(invalid);
        }
        Err(invalid())
    }

    pub fn epoch_millis(&self) -> i64 {
        self.at.timestamp_millis()
    }

    pub fn remaining_at(&self, now_ms: i64) -> Remaining {
        Remaining::from_distance(self.epoch_millis().saturating_sub(now_ms))
    }
}

/// Whole days, hours, minutes and seconds left, each floored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Breakdown {
    /// `distance` must not be negative.
    pub fn from_millis(distance: i64) -> Self {
        Self {
            days: distance / MS_PER_DAY,
            hours: (distance % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (distance % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (distance % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {}h {}m {}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Expired,
    Left(Breakdown),
}

impl Remaining {
    pub fn from_distance(distance_ms: i64) -> Self {
        if distance_ms < 0 {
            Remaining::Expired
        } else {
            Remaining::Left(Breakdown::from_millis(distance_ms))
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Remaining::Expired)
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remaining::Expired => f.write_str("Expired"),
            Remaining::Left(b) => fmt::Display::fmt(b, f),
        }
    }
}
