//! Overall counts for the requested range.

use crate::aggregator::DataAggregator;
use crate::bucket::StatusCounts;
use crate::types::Summary;
use rollcall_common::{round2, AttendanceEvent};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAggregator {
    total_students: u64,
}

impl SummaryAggregator {
    /// `total_students` is the roster size matching the request filters.
    pub fn new(total_students: u64) -> Self {
        Self { total_students }
    }
}

impl DataAggregator<Summary> for SummaryAggregator {
    fn aggregate(&self, events: &[AttendanceEvent]) -> Summary {
        let mut counts = StatusCounts::default();
        let mut students = HashSet::new();
        for event in events {
            counts.record(event.status);
            students.insert(&event.student_id);
        }

        Summary {
            total_students: self.total_students,
            unique_students_with_attendance: students.len() as u64,
            present_count: counts.present,
            late_count: counts.late,
            absent_count: counts.absent,
            excused_count: counts.excused,
            total_attendance: counts.total,
            attendance_rate: round2(counts.attendance_rate()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_common::test_utils::event_fixtures::event;
    use rollcall_common::test_utils::mock_timestamp;
    use rollcall_common::AttendanceStatus::{Absent, Excused, Late, Present};

    #[test]
    fn test_summary_counts() {
        let at = mock_timestamp(2025, 1, 15, 9, 0, 0);
        let events = vec![
            event("s1", Present, at),
            event("s1", Late, at),
            event("s2", Absent, at),
            event("s3", Excused, at),
        ];

        let summary = SummaryAggregator::new(10).aggregate(&events);

        assert_eq!(summary.total_students, 10);
        assert_eq!(summary.unique_students_with_attendance, 3);
        assert_eq!(summary.total_attendance, 4);
        assert_eq!(summary.present_count, 1);
        assert_eq!(summary.late_count, 1);
        assert_eq!(summary.attendance_rate, 50.0);
    }
}
