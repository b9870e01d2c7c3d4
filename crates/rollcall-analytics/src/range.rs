//! Resolution of a filter's time range into concrete instants.

use crate::bucket::{BucketKeyDeriver, Granularity};
use crate::filter::{AnalyticsFilter, TimeRange};
use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rollcall_common::{Result, RollcallError};
use std::fmt;

/// Daily-bucketed ranges longer than this are rejected.
pub const MAX_DAILY_SPAN_DAYS: i64 = 3_660;

/// Source of the current instant.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A time range resolved against a clock and a timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRange {
    pub time_range: TimeRange,
    /// Inclusive start instant.
    pub start: DateTime<Utc>,
    /// Inclusive end instant (23:59:59.999 local time of the last day).
    pub end: DateTime<Utc>,
    /// First local calendar day.
    pub start_date: NaiveDate,
    /// Last local calendar day.
    pub end_date: NaiveDate,
    pub tz: Tz,
}

impl ResolvedRange {
    /// Resolves `filter` at instant `now` in `tz`.
    pub fn resolve(filter: &AnalyticsFilter, now: DateTime<Utc>, tz: Tz) -> Result<Self> {
        let today = now.with_timezone(&tz).date_naive();

        let (start_date, end_date) = match (filter.start_date, filter.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => match filter.time_range {
                TimeRange::Today => (today, today),
                TimeRange::Week => (today - Duration::days(6), today),
                TimeRange::Month => (today - Duration::days(29), today),
                TimeRange::Quarter => (today - Duration::days(89), today),
                TimeRange::Year => (year_start(today)?, today),
                TimeRange::Custom => {
                    return Err(RollcallError::validation_field(
                        "Custom time range requires both startDate and endDate",
                        "timeRange",
                    ))
                }
            },
        };

        if start_date > end_date {
            return Err(RollcallError::validation_field(
                format!("startDate {start_date} is after endDate {end_date}"),
                "startDate",
            ));
        }

        if filter.time_range.granularity() == Granularity::Daily
            && (end_date - start_date).num_days() >= MAX_DAILY_SPAN_DAYS
        {
            return Err(RollcallError::validation_field(
                format!("Daily ranges are limited to {MAX_DAILY_SPAN_DAYS} days"),
                "endDate",
            ));
        }

        Ok(Self {
            time_range: filter.time_range,
            start: start_of_day(start_date, tz)?,
            end: end_of_day(end_date, tz)?,
            start_date,
            end_date,
            tz,
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.time_range.granularity()
    }

    /// Bucket-key deriver shared by every bucketed view of this range.
    pub fn deriver(&self) -> BucketKeyDeriver {
        BucketKeyDeriver::new(self.granularity(), self.start, self.tz)
    }
}

fn year_start(today: NaiveDate) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(today.year(), 1, 1)
        .ok_or_else(|| RollcallError::validation(format!("No January 1st in year {}", today.year())))
}

fn start_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| RollcallError::validation(format!("Invalid start of day for {date}")))?;
    localize(naive, tz)
        .ok_or_else(|| RollcallError::validation_field(format!("startDate {date} is out of range"), "startDate"))
}

fn end_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    let naive = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| RollcallError::validation(format!("Invalid end of day for {date}")))?;
    localize(naive, tz)
        .ok_or_else(|| RollcallError::validation_field(format!("endDate {date} is out of range"), "endDate"))
}

/// Local wall time to UTC. Ambiguous times take the earlier instant; times
/// inside a DST gap are shifted forward by the gap. `None` when the shift
/// leaves the representable range.
fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let shifted = naive.checked_add_signed(Duration::hours(1))?;
            match tz.from_local_datetime(&shifted) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
                LocalResult::None => Some(Utc.from_utc_datetime(&naive)),
            }
        }
    }
}
