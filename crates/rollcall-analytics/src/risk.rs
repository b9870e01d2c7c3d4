//! Per-student attendance risk classification.

use crate::aggregator::DataAggregator;
use crate::bucket::StatusCounts;
use crate::filter::RiskLevel;
use crate::types::RiskLevelCount;
use rollcall_common::{AttendanceEvent, StudentId};
use std::collections::{BTreeMap, HashMap};

/// Counts students per risk tier.
///
/// Only tiers with at least one student are reported, in the order
/// none, low, medium, high.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskLevelAggregator;

impl RiskLevelAggregator {
    /// Tier of every student with at least one event.
    pub fn classify(events: &[AttendanceEvent]) -> HashMap<&StudentId, RiskLevel> {
        let mut per_student: HashMap<&StudentId, StatusCounts> = HashMap::new();
        for event in events {
            per_student
                .entry(&event.student_id)
                .or_default()
                .record(event.status);
        }

        per_student
            .into_iter()
            .map(|(student, counts)| (student, RiskLevel::from_rate(counts.attendance_rate())))
            .collect()
    }

    /// Events of the students whose tier is `level`, in input order.
    pub fn retain_tier(events: &[AttendanceEvent], level: RiskLevel) -> Vec<AttendanceEvent> {
        let tiers = Self::classify(events);
        events
            .iter()
            .filter(|event| tiers.get(&event.student_id) == Some(&level))
            .cloned()
            .collect()
    }
}

impl DataAggregator<Vec<RiskLevelCount>> for RiskLevelAggregator {
    fn aggregate(&self, events: &[AttendanceEvent]) -> Vec<RiskLevelCount> {
        let mut tiers: BTreeMap<RiskLevel, u64> = BTreeMap::new();
        for level in Self::classify(events).into_values() {
            *tiers.entry(level).or_insert(0) += 1;
        }

        tiers
            .into_iter()
            .map(|(risk_level, student_count)| RiskLevelCount {
                risk_level,
                student_count,
            })
            .collect()
    }
}
