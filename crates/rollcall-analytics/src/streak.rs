//! Per-bucket good/poor tallies and their summary statistics.

use crate::aggregator::{BucketedReducer, DataAggregator};
use crate::types::{StreakData, StreakPoint, StreakStats};
use rollcall_common::{percentage, round2, AttendanceEvent};

/// Counts good (present or late) and poor (absent) events per bucket.
///
/// These are tallies within a bucket, not consecutive runs.
#[derive(Debug, Clone)]
pub struct StreakAggregator {
    reducer: BucketedReducer,
}

impl StreakAggregator {
    pub fn new(reducer: BucketedReducer) -> Self {
        Self { reducer }
    }
}

impl DataAggregator<StreakData> for StreakAggregator {
    fn aggregate(&self, events: &[AttendanceEvent]) -> StreakData {
        let data = self.reducer.reduce(events, |period, counts| StreakPoint {
            period,
            good_streaks: counts.attended(),
            poor_streaks: counts.absent,
            present_count: counts.present,
            late_count: counts.late,
            absent_count: counts.absent,
            excused_count: counts.excused,
            total_count: counts.total,
        });
        let stats = streak_stats(&data);
        StreakData { data, stats }
    }
}

/// Statistics over key-ordered streak points.
pub fn streak_stats(points: &[StreakPoint]) -> StreakStats {
    let total_good: u64 = points.iter().map(|p| p.good_streaks).sum();
    let total_events: u64 = points.iter().map(|p| p.total_count).sum();

    StreakStats {
        max_good_streak: points.iter().map(|p| p.good_streaks).max().unwrap_or(0),
        max_poor_streak: points.iter().map(|p| p.poor_streaks).max().unwrap_or(0),
        current_streak: points.last().map_or(0, |p| p.good_streaks),
        average_streak: round2(percentage(total_good, total_events)),
        longest_streak: points
            .iter()
            .map(|p| p.good_streaks.max(p.poor_streaks))
            .max()
            .unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{BucketKeyDeriver, Granularity};
    use crate::fill::FillPlan;
    use rollcall_common::test_utils::event_fixtures::event;
    use rollcall_common::test_utils::mock_timestamp;
    use rollcall_common::AttendanceStatus::{Absent, Excused, Late, Present};

    fn hourly() -> BucketedReducer {
        let deriver = BucketKeyDeriver::new(
            Granularity::Hourly,
            mock_timestamp(2025, 1, 15, 0, 0, 0),
            chrono_tz::UTC,
        );
        BucketedReducer::new(deriver, FillPlan::Hours)
    }

    #[test]
    fn test_tallies_and_stats() {
        let events = vec![
            event("s1", Present, mock_timestamp(2025, 1, 15, 8, 0, 0)),
            event("s2", Late, mock_timestamp(2025, 1, 15, 8, 5, 0)),
            event("s3", Absent, mock_timestamp(2025, 1, 15, 8, 5, 0)),
            event("s1", Absent, mock_timestamp(2025, 1, 15, 10, 0, 0)),
            event("s2", Absent, mock_timestamp(2025, 1, 15, 10, 0, 0)),
            event("s3", Absent, mock_timestamp(2025, 1, 15, 10, 0, 0)),
            event("s4", Excused, mock_timestamp(2025, 1, 15, 10, 0, 0)),
            event("s1", Present, mock_timestamp(2025, 1, 15, 23, 0, 0)),
        ];

        let streaks = StreakAggregator::new(hourly()).aggregate(&events);

        assert_eq!(streaks.data.len(), 24);
        assert_eq!(streaks.data[8].good_streaks, 2);
        assert_eq!(streaks.data[8].poor_streaks, 1);
        assert_eq!(streaks.data[10].poor_streaks, 3);
        assert_eq!(streaks.data[10].excused_count, 1);

        let stats = &streaks.stats;
        assert_eq!(stats.max_good_streak, 2);
        assert_eq!(stats.max_poor_streak, 3);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 3);
        // 3 good out of 8 events
        assert_eq!(stats.average_streak, 37.5);
    }

    #[test]
    fn test_current_streak_uses_last_bucket_even_when_empty() {
        let events = vec![event("s1", Present, mock_timestamp(2025, 1, 15, 8, 0, 0))];
        let streaks = StreakAggregator::new(hourly()).aggregate(&events);
        assert_eq!(streaks.stats.current_streak, 0);
        assert_eq!(streaks.stats.average_streak, 100.0);
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(streak_stats(&[]), StreakStats::default());
    }
}
