//! Bucket keys and per-bucket status counters shared by every time-bucketed view.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use rollcall_common::{percentage, AttendanceStatus};
use serde::{Serialize, Serializer};
use std::fmt;

const WEEK_MILLIS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Grouping granularity for time-bucketed views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

/// Key of one time bucket.
///
/// Within a single request every key has the same variant, so the derived
/// ordering is numeric for hours, weeks and months and chronological for dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    /// Hour of day, 0 to 23.
    Hour(u32),
    /// Calendar date.
    Date(NaiveDate),
    /// Week number relative to the range start, starting at 1.
    Week(u32),
    /// Month of year, 1 to 12.
    Month(u32),
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Hour(hour) => write!(f, "{hour}"),
            BucketKey::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            BucketKey::Week(week) => write!(f, "Week {week}"),
            BucketKey::Month(month) => write!(f, "{month}"),
        }
    }
}

impl Serialize for BucketKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Maps a timestamp to its bucket. One deriver is shared by all views of a request.
#[derive(Debug, Clone)]
pub struct BucketKeyDeriver {
    granularity: Granularity,
    range_start: DateTime<Utc>,
    tz: Tz,
}

impl BucketKeyDeriver {
    pub fn new(granularity: Granularity, range_start: DateTime<Utc>, tz: Tz) -> Self {
        Self {
            granularity,
            range_start,
            tz,
        }
    }

    pub fn derive(&self, timestamp: DateTime<Utc>) -> BucketKey {
        let local = timestamp.with_timezone(&self.tz);
        match self.granularity {
            Granularity::Hourly => BucketKey::Hour(local.hour()),
            Granularity::Daily => BucketKey::Date(local.date_naive()),
            Granularity::Monthly => BucketKey::Month(local.month()),
            Granularity::Weekly => {
                let elapsed = (timestamp - self.range_start).num_milliseconds();
                // ceil(elapsed / week), never below week 1
                let week = if elapsed <= 0 {
                    1
                } else {
                    (elapsed + WEEK_MILLIS - 1) / WEEK_MILLIS
                };
                BucketKey::Week(u32::try_from(week.max(1)).unwrap_or(u32::MAX))
            }
        }
    }
}

/// Per-status tallies for a bucket, a department or a student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub present: u64,
    pub late: u64,
    pub absent: u64,
    pub excused: u64,
    pub total: u64,
}

impl StatusCounts {
    pub fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Excused => self.excused += 1,
        }
        self.total += 1;
    }

    /// Present plus late.
    pub fn attended(&self) -> u64 {
        self.present + self.late
    }

    /// Unrounded attendance rate in percent; 0 for an empty bucket.
    pub fn attendance_rate(&self) -> f64 {
        percentage(self.attended(), self.total)
    }

    /// Unrounded late rate in percent; 0 for an empty bucket.
    pub fn late_rate(&self) -> f64 {
        percentage(self.late, self.total)
    }
}
