//! Dense-series filling so bucketed views have no gaps.

use crate::bucket::{BucketKey, StatusCounts};
use crate::filter::TimeRange;
use crate::range::ResolvedRange;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Which zero buckets a range requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillPlan {
    /// Hours 0 to 23.
    Hours,
    /// Every calendar day, both ends inclusive.
    Days { start: NaiveDate, end: NaiveDate },
    /// Months 1 to 12.
    Months,
    /// Observed buckets only.
    Sparse,
}

impl FillPlan {
    pub fn for_range(range: &ResolvedRange) -> Self {
        match range.time_range {
            TimeRange::Today => FillPlan::Hours,
            TimeRange::Week | TimeRange::Month | TimeRange::Custom => FillPlan::Days {
                start: range.start_date,
                end: range.end_date,
            },
            TimeRange::Year => FillPlan::Months,
            TimeRange::Quarter => FillPlan::Sparse,
        }
    }

    /// Inserts a zero counter for every missing key. Existing buckets are untouched.
    pub fn apply(&self, buckets: &mut BTreeMap<BucketKey, StatusCounts>) {
        match self {
            FillPlan::Hours => {
                for hour in 0..24 {
                    buckets.entry(BucketKey::Hour(hour)).or_default();
                }
            }
            FillPlan::Days { start, end } => {
                for day in start.iter_days().take_while(|day| day <= end) {
                    buckets.entry(BucketKey::Date(day)).or_default();
                }
            }
            FillPlan::Months => {
                for month in 1..=12 {
                    buckets.entry(BucketKey::Month(month)).or_default();
                }
            }
            FillPlan::Sparse => {}
        }
    }
}
