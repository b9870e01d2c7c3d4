//! Per-department attendance totals.

use crate::aggregator::DataAggregator;
use crate::bucket::StatusCounts;
use crate::types::DepartmentStat;
use rollcall_common::{round2, AttendanceEvent, DepartmentRef};
use std::collections::BTreeMap;

/// Groups events by department name. Events without a department are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepartmentAggregator;

impl DataAggregator<Vec<DepartmentStat>> for DepartmentAggregator {
    fn aggregate(&self, events: &[AttendanceEvent]) -> Vec<DepartmentStat> {
        let mut by_name: BTreeMap<&str, (&DepartmentRef, StatusCounts)> = BTreeMap::new();

        for event in events {
            if let Some(department) = &event.department {
                by_name
                    .entry(department.name.as_str())
                    .or_insert_with(|| (department, StatusCounts::default()))
                    .1
                    .record(event.status);
            }
        }

        by_name
            .into_values()
            .map(|(department, counts)| DepartmentStat {
                department_id: department.department_id.clone(),
                name: department.name.clone(),
                code: department.code.clone(),
                total_classes: counts.total,
                attended_classes: counts.attended(),
                attendance_rate: round2(counts.attendance_rate()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_common::test_utils::event_fixtures::{event, event_in};
    use rollcall_common::test_utils::mock_timestamp;
    use rollcall_common::AttendanceStatus::{Absent, Excused, Late, Present};

    #[test]
    fn test_groups_by_department_sorted_by_name() {
        let at = mock_timestamp(2025, 1, 15, 9, 0, 0);
        let events = vec![
            event_in("s1", "Science", Present, at),
            event_in("s2", "Science", Absent, at),
            event_in("s3", "Arts", Late, at),
            event_in("s4", "Arts", Excused, at),
            event_in("s5", "Arts", Present, at),
            event("s6", Present, at),
        ];

        let stats = DepartmentAggregator.aggregate(&events);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "Arts");
        assert_eq!(stats[0].code, "ART");
        assert_eq!(stats[0].department_id, "dept-arts");
        assert_eq!(stats[0].total_classes, 3);
        assert_eq!(stats[0].attended_classes, 2);
        assert_eq!(stats[0].attendance_rate, 66.67);

        assert_eq!(stats[1].name, "Science");
        assert_eq!(stats[1].attendance_rate, 50.0);
    }

    #[test]
    fn test_events_without_department_yield_nothing() {
        let events = vec![event("s1", Present, mock_timestamp(2025, 1, 15, 9, 0, 0))];
        assert!(DepartmentAggregator.aggregate(&events).is_empty());
    }
}
