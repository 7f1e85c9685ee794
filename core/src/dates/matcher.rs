use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::prelude::{AttendError, AttendResult};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Calendar-date comparisons on feed timestamps, evaluated on the local clock.
pub struct DateMatcher;

impl DateMatcher {
    /// Parses an ISO-8601-like timestamp into local wall-clock time.
    ///
    /// Offsets are converted to the local zone; naive values are taken as local.
    pub fn parse(raw: &str) -> AttendResult<NaiveDateTime> {
        let trimmed = raw.trim();
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(with_offset.with_timezone(&Local).naive_local());
        }
        for format in NAIVE_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(parsed);
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(date.and_time(NaiveTime::MIN));
        }
        Err(AttendError::DateParse {
            value: raw.to_string(),
        })
    }

    pub fn calendar_date(raw: &str) -> AttendResult<NaiveDate> {
        Self::parse(raw).map(|parsed| parsed.date())
    }

    pub fn is_same_calendar_day(a: &str, b: &str) -> AttendResult<bool> {
        Ok(Self::calendar_date(a)? == Self::calendar_date(b)?)
    }

    /// True when the calendar date of `timestamp` lies in `[start, end]`,
    /// ignoring time-of-day on all three values.
    pub fn is_within_inclusive_range(
        timestamp: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AttendResult<bool> {
        let date = Self::calendar_date(timestamp)?;
        Ok(date >= start.date() && date <= end.date())
    }
}
