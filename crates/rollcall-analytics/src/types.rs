//! Output types for every analytics view.

use crate::bucket::{BucketKey, StatusCounts};
use crate::filter::RiskLevel;
use rollcall_common::round2;
use serde::Serialize;

/// Attendance counts and rate for one time bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub period: BucketKey,
    pub present_count: u64,
    pub late_count: u64,
    pub absent_count: u64,
    pub excused_count: u64,
    pub total_count: u64,
    pub attendance_rate: f64,
}

impl TimeSeriesPoint {
    pub fn from_counts(period: BucketKey, counts: &StatusCounts) -> Self {
        Self {
            period,
            present_count: counts.present,
            late_count: counts.late,
            absent_count: counts.absent,
            excused_count: counts.excused,
            total_count: counts.total,
            attendance_rate: round2(counts.attendance_rate()),
        }
    }
}

/// Time-series point with the share of late arrivals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LateArrivalPoint {
    #[serde(flatten)]
    pub counts: TimeSeriesPoint,
    pub late_rate: f64,
}

/// Time-series point with a trailing moving average of the attendance rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternPoint {
    #[serde(flatten)]
    pub counts: TimeSeriesPoint,
    pub moving_average: f64,
}

/// Good and poor tallies for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakPoint {
    pub period: BucketKey,
    pub good_streaks: u64,
    pub poor_streaks: u64,
    pub present_count: u64,
    pub late_count: u64,
    pub absent_count: u64,
    pub excused_count: u64,
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakStats {
    pub max_good_streak: u64,
    pub max_poor_streak: u64,
    pub current_streak: u64,
    pub average_streak: f64,
    pub longest_streak: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreakData {
    pub data: Vec<StreakPoint>,
    pub stats: StreakStats,
}

/// Totals for one department.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStat {
    pub department_id: String,
    pub name: String,
    pub code: String,
    pub total_classes: u64,
    pub attended_classes: u64,
    pub attendance_rate: f64,
}

/// Number of students in one risk tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskLevelCount {
    pub risk_level: RiskLevel,
    pub student_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_students: u64,
    pub unique_students_with_attendance: u64,
    pub present_count: u64,
    pub late_count: u64,
    pub absent_count: u64,
    pub excused_count: u64,
    pub total_attendance: u64,
    pub attendance_rate: f64,
}

/// Everything the analytics endpoint returns for one filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsBundle {
    pub time_based_data: Vec<TimeSeriesPoint>,
    pub department_stats: Vec<DepartmentStat>,
    pub risk_level_data: Vec<RiskLevelCount>,
    pub late_arrival_data: Vec<LateArrivalPoint>,
    pub pattern_data: Vec<PatternPoint>,
    pub streak_data: StreakData,
    pub summary: Summary,
}
