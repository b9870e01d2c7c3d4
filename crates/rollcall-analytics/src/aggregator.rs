//! Aggregation pipeline turning one batch of attendance events into every view.

use crate::bucket::{BucketKey, BucketKeyDeriver, StatusCounts};
use crate::department::DepartmentAggregator;
use crate::fill::FillPlan;
use crate::filter::RiskLevel;
use crate::range::ResolvedRange;
use crate::risk::RiskLevelAggregator;
use crate::streak::StreakAggregator;
use crate::summary::SummaryAggregator;
use crate::types::{AnalyticsBundle, LateArrivalPoint, PatternPoint, TimeSeriesPoint};
use rollcall_common::{round2, AttendanceEvent};
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Reduces a borrowed batch of events into one view.
pub trait DataAggregator<T> {
    fn aggregate(&self, events: &[AttendanceEvent]) -> T;
}

/// Generic bucketed reduction: one forward pass of counters, then a dense fill.
#[derive(Debug, Clone)]
pub struct BucketedReducer {
    deriver: BucketKeyDeriver,
    fill: FillPlan,
}

impl BucketedReducer {
    pub fn new(deriver: BucketKeyDeriver, fill: FillPlan) -> Self {
        Self { deriver, fill }
    }

    pub fn for_range(range: &ResolvedRange) -> Self {
        Self::new(range.deriver(), FillPlan::for_range(range))
    }

    /// Dense, key-ordered counters.
    pub fn counts(&self, events: &[AttendanceEvent]) -> BTreeMap<BucketKey, StatusCounts> {
        let mut buckets: BTreeMap<BucketKey, StatusCounts> = BTreeMap::new();
        for event in events {
            buckets
                .entry(self.deriver.derive(event.timestamp))
                .or_default()
                .record(event.status);
        }
        self.fill.apply(&mut buckets);
        buckets
    }

    /// Projects each dense bucket into a view entry, in key order.
    pub fn reduce<P, F>(&self, events: &[AttendanceEvent], mut project: F) -> Vec<P>
    where
        F: FnMut(BucketKey, &StatusCounts) -> P,
    {
        self.counts(events)
            .iter()
            .map(|(key, counts)| project(*key, counts))
            .collect()
    }
}

/// Attendance counts and rate per bucket.
#[derive(Debug, Clone)]
pub struct TimeSeriesAggregator {
    reducer: BucketedReducer,
}

impl TimeSeriesAggregator {
    pub fn new(reducer: BucketedReducer) -> Self {
        Self { reducer }
    }
}

impl DataAggregator<Vec<TimeSeriesPoint>> for TimeSeriesAggregator {
    fn aggregate(&self, events: &[AttendanceEvent]) -> Vec<TimeSeriesPoint> {
        self.reducer.reduce(events, TimeSeriesPoint::from_counts)
    }
}

/// Late-arrival rate per bucket.
#[derive(Debug, Clone)]
pub struct LateArrivalAggregator {
    reducer: BucketedReducer,
}

impl LateArrivalAggregator {
    pub fn new(reducer: BucketedReducer) -> Self {
        Self { reducer }
    }
}

impl DataAggregator<Vec<LateArrivalPoint>> for LateArrivalAggregator {
    fn aggregate(&self, events: &[AttendanceEvent]) -> Vec<LateArrivalPoint> {
        self.reducer.reduce(events, |key, counts| LateArrivalPoint {
            counts: TimeSeriesPoint::from_counts(key, counts),
            late_rate: round2(counts.late_rate()),
        })
    }
}

/// Time series with a trailing moving average of the attendance rate.
#[derive(Debug, Clone)]
pub struct PatternAggregator {
    reducer: BucketedReducer,
    max_window: usize,
}

impl PatternAggregator {
    pub fn new(reducer: BucketedReducer, max_window: usize) -> Self {
        Self {
            reducer,
            max_window: max_window.max(1),
        }
    }
}

impl DataAggregator<Vec<PatternPoint>> for PatternAggregator {
    fn aggregate(&self, events: &[AttendanceEvent]) -> Vec<PatternPoint> {
        let buckets = self.reducer.counts(events);
        let rates: Vec<f64> = buckets.values().map(StatusCounts::attendance_rate).collect();
        let averages = moving_average(&rates, self.max_window);

        buckets
            .iter()
            .zip(averages)
            .map(|((key, counts), average)| PatternPoint {
                counts: TimeSeriesPoint::from_counts(*key, counts),
                moving_average: round2(average),
            })
            .collect()
    }
}

/// Trailing mean over a window of `min(max_window, values.len())`.
pub fn moving_average(values: &[f64], max_window: usize) -> Vec<f64> {
    let window = max_window.min(values.len()).max(1);
    (0..values.len())
        .map(|i| {
            let from = (i + 1).saturating_sub(window);
            let slice = &values[from..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Runs every view over one shared event batch.
#[derive(Debug, Clone)]
pub struct AggregationManager {
    moving_average_window: usize,
}

impl AggregationManager {
    pub fn new(moving_average_window: usize) -> Self {
        Self {
            moving_average_window,
        }
    }

    /// Builds the full bundle. Aggregators never fail and never mutate `events`.
    ///
    /// A risk filter scopes every view to the students in that tier.
    #[instrument(skip(self, events), fields(events = events.len(), range = %range.time_range))]
    pub fn aggregate_all(
        &self,
        events: &[AttendanceEvent],
        range: &ResolvedRange,
        total_students: u64,
        risk_filter: Option<RiskLevel>,
    ) -> AnalyticsBundle {
        let scoped: Cow<'_, [AttendanceEvent]> = match risk_filter {
            Some(level) => Cow::Owned(RiskLevelAggregator::retain_tier(events, level)),
            None => Cow::Borrowed(events),
        };
        let events = scoped.as_ref();
        let reducer = BucketedReducer::for_range(range);

        let time_based_data = TimeSeriesAggregator::new(reducer.clone()).aggregate(events);
        let late_arrival_data = LateArrivalAggregator::new(reducer.clone()).aggregate(events);
        let pattern_data =
            PatternAggregator::new(reducer.clone(), self.moving_average_window).aggregate(events);
        let streak_data = StreakAggregator::new(reducer).aggregate(events);
        let department_stats = DepartmentAggregator.aggregate(events);
        let risk_level_data = RiskLevelAggregator.aggregate(events);
        let summary = SummaryAggregator::new(total_students).aggregate(events);

        debug!(
            buckets = time_based_data.len(),
            departments = department_stats.len(),
            risk_tiers = risk_level_data.len(),
            "Aggregated analytics views"
        );

        AnalyticsBundle {
            time_based_data,
            department_stats,
            risk_level_data,
            late_arrival_data,
            pattern_data,
            streak_data,
            summary,
        }
    }
}

impl Default for AggregationManager {
    fn default() -> Self {
        Self::new(7)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AnalyticsFilter, TimeRange};
    use chrono::{DateTime, TimeZone, Utc};
    use rollcall_common::test_utils::event_fixtures::event;
    use rollcall_common::test_utils::{assert_approx_eq, mock_timestamp};
    use rollcall_common::AttendanceStatus::{Absent, Excused, Late, Present};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 18, 0, 0).unwrap()
    }

    fn range(time_range: TimeRange) -> ResolvedRange {
        let filter = AnalyticsFilter {
            time_range,
            ..AnalyticsFilter::default()
        };
        ResolvedRange::resolve(&filter, now(), chrono_tz::UTC).unwrap()
    }

    #[test]
    fn test_moving_average_window() {
        let averages = moving_average(&[100.0, 0.0, 100.0], 7);
        assert_eq!(averages.len(), 3);
        assert_approx_eq(averages[0], 100.0, 1e-9);
        assert_approx_eq(averages[1], 50.0, 1e-9);
        assert_approx_eq(averages[2], 66.666, 0.001);

        let trailing = moving_average(&[10.0, 20.0, 30.0, 40.0], 2);
        assert_eq!(trailing, vec![10.0, 15.0, 25.0, 35.0]);

        assert!(moving_average(&[], 7).is_empty());
    }

    #[test]
    fn test_today_series_is_dense() {
        let events = vec![
            event("s1", Present, mock_timestamp(2025, 1, 15, 9, 0, 0)),
            event("s2", Late, mock_timestamp(2025, 1, 15, 9, 10, 0)),
            event("s3", Absent, mock_timestamp(2025, 1, 15, 13, 0, 0)),
        ];
        let reducer = BucketedReducer::for_range(&range(TimeRange::Today));
        let series = TimeSeriesAggregator::new(reducer).aggregate(&events);

        assert_eq!(series.len(), 24);
        let periods: Vec<String> = series.iter().map(|p| p.period.to_string()).collect();
        let expected: Vec<String> = (0..24).map(|h| h.to_string()).collect();
        assert_eq!(periods, expected);

        assert_eq!(series[9].total_count, 2);
        assert_eq!(series[9].attendance_rate, 100.0);
        assert_eq!(series[13].absent_count, 1);
        assert_eq!(series[13].attendance_rate, 0.0);
        assert_eq!(series[0].total_count, 0);
    }

    #[test]
    fn test_late_arrival_rates() {
        let events = vec![
            event("s1", Late, mock_timestamp(2025, 1, 14, 8, 0, 0)),
            event("s2", Present, mock_timestamp(2025, 1, 14, 8, 5, 0)),
            event("s3", Excused, mock_timestamp(2025, 1, 14, 8, 5, 0)),
        ];
        let reducer = BucketedReducer::for_range(&range(TimeRange::Week));
        let late = LateArrivalAggregator::new(reducer).aggregate(&events);

        assert_eq!(late.len(), 7);
        let day = late
            .iter()
            .find(|p| p.counts.period.to_string() == "2025-01-14")
            .unwrap();
        assert_eq!(day.late_rate, 33.33);
        assert_eq!(day.counts.attendance_rate, 66.67);
    }

    #[test]
    fn test_pattern_moving_average_over_dense_buckets() {
        let filter = AnalyticsFilter {
            time_range: TimeRange::Custom,
            start_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 1),
            end_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 3),
            ..AnalyticsFilter::default()
        };
        let range = ResolvedRange::resolve(&filter, now(), chrono_tz::UTC).unwrap();
        let events = vec![
            event("s1", Present, mock_timestamp(2025, 1, 1, 9, 0, 0)),
            event("s1", Absent, mock_timestamp(2025, 1, 2, 9, 0, 0)),
            event("s1", Present, mock_timestamp(2025, 1, 3, 9, 0, 0)),
        ];

        let pattern = PatternAggregator::new(BucketedReducer::for_range(&range), 7).aggregate(&events);

        let rates: Vec<f64> = pattern.iter().map(|p| p.counts.attendance_rate).collect();
        assert_eq!(rates, vec![100.0, 0.0, 100.0]);
        assert_eq!(pattern[2].moving_average, 66.67);
    }

    #[test]
    fn test_quarter_buckets_are_sparse() {
        let events = vec![
            event("s1", Present, mock_timestamp(2025, 1, 10, 9, 0, 0)),
            event("s1", Present, mock_timestamp(2024, 11, 1, 9, 0, 0)),
        ];
        let reducer = BucketedReducer::for_range(&range(TimeRange::Quarter));
        let series = TimeSeriesAggregator::new(reducer).aggregate(&events);

        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|p| p.period.to_string().starts_with("Week ")));
        assert!(series[0].period < series[1].period);
    }

    #[test]
    fn test_aggregate_all_empty_input() {
        let manager = AggregationManager::default();
        let bundle = manager.aggregate_all(&[], &range(TimeRange::Year), 0, None);

        assert_eq!(bundle.time_based_data.len(), 12);
        assert!(bundle.time_based_data.iter().all(|p| p.total_count == 0 && p.attendance_rate == 0.0));
        assert_eq!(bundle.pattern_data.len(), 12);
        assert_eq!(bundle.streak_data.data.len(), 12);
        assert!(bundle.department_stats.is_empty());
        assert!(bundle.risk_level_data.is_empty());
        assert_eq!(bundle.summary, crate::types::Summary::default());
    }

    #[test]
    fn test_risk_filter_scopes_every_view() {
        let at = mock_timestamp(2025, 1, 14, 9, 0, 0);
        let events = vec![
            event("s1", Present, at),
            event("s2", Absent, at),
            event("s2", Absent, mock_timestamp(2025, 1, 13, 9, 0, 0)),
        ];
        let bundle = AggregationManager::default().aggregate_all(
            &events,
            &range(TimeRange::Week),
            2,
            Some(RiskLevel::High),
        );

        let tiered: u64 = bundle.risk_level_data.iter().map(|r| r.student_count).sum();
        assert_eq!(tiered, 1);
        assert_eq!(bundle.summary.unique_students_with_attendance, tiered);
        assert_eq!(bundle.summary.total_attendance, 2);
        assert_eq!(bundle.summary.present_count, 0);
        let series_total: u64 = bundle.time_based_data.iter().map(|p| p.total_count).sum();
        assert_eq!(series_total, 2);
        assert_eq!(bundle.streak_data.stats.max_good_streak, 0);
    }

    #[test]
    fn test_views_share_bucket_set() {
        let events = vec![
            event("s1", Present, mock_timestamp(2025, 1, 10, 9, 0, 0)),
            event("s2", Absent, mock_timestamp(2025, 1, 12, 9, 0, 0)),
        ];
        let bundle = AggregationManager::default().aggregate_all(&events, &range(TimeRange::Month), 2, None);

        let periods = |keys: Vec<BucketKey>| keys.into_iter().map(|k| k.to_string()).collect::<Vec<_>>();
        let series = periods(bundle.time_based_data.iter().map(|p| p.period).collect());
        assert_eq!(series.len(), 30);
        assert_eq!(series, periods(bundle.late_arrival_data.iter().map(|p| p.counts.period).collect()));
        assert_eq!(series, periods(bundle.pattern_data.iter().map(|p| p.counts.period).collect()));
        assert_eq!(series, periods(bundle.streak_data.data.iter().map(|p| p.period).collect()));
    }
}
