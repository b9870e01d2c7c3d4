//! Attendance record sources.

use crate::filter::AnalyticsFilter;
use crate::range::ResolvedRange;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rollcall_common::{AttendanceEvent, Result, RollcallError, StudentRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Record filters pushed down to the source.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub department_id: Option<String>,
    pub subject_id: Option<String>,
    pub course_id: Option<String>,
    pub section_id: Option<String>,
    pub year_level: Option<String>,
    /// Maximum number of events returned.
    pub limit: usize,
}

impl RecordQuery {
    pub fn new(filter: &AnalyticsFilter, range: &ResolvedRange, limit: usize) -> Self {
        Self {
            start: range.start,
            end: range.end,
            department_id: filter.department_id.clone(),
            subject_id: filter.subject_id.clone(),
            course_id: filter.course_id.clone(),
            section_id: filter.section_id.clone(),
            year_level: filter.year_level.clone(),
            limit,
        }
    }

    pub fn matches_event(&self, event: &AttendanceEvent) -> bool {
        event.timestamp >= self.start
            && event.timestamp <= self.end
            && matches(
                &self.department_id,
                event.department.as_ref().map(|d| d.department_id.as_str()),
            )
            && matches(&self.subject_id, event.subject_id.as_deref())
            && matches(&self.course_id, event.course_id.as_deref())
            && matches(&self.section_id, event.section_id.as_deref())
            && matches(&self.year_level, event.year_level.as_deref())
    }

    /// Roster filters ignore the time window and the subject.
    pub fn matches_student(&self, student: &StudentRecord) -> bool {
        matches(&self.department_id, student.department_id.as_deref())
            && matches(&self.course_id, student.course_id.as_deref())
            && matches(&self.section_id, student.section_id.as_deref())
            && matches(&self.year_level, student.year_level.as_deref())
    }
}

fn matches(wanted: &Option<String>, actual: Option<&str>) -> bool {
    match wanted {
        Some(wanted) => actual == Some(wanted.as_str()),
        None => true,
    }
}

/// Upstream provider of attendance events and the student roster.
#[async_trait]
pub trait AttendanceSource: Send + Sync {
    /// Matching events, most recent first, at most `query.limit`.
    async fn fetch_events(&self, query: &RecordQuery) -> Result<Vec<AttendanceEvent>>;

    /// Number of roster students matching the query's roster filters.
    async fn count_students(&self, query: &RecordQuery) -> Result<u64>;
}

/// Serialized dataset: `{ "students": [...], "events": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub students: Vec<StudentRecord>,
    #[serde(default)]
    pub events: Vec<AttendanceEvent>,
}

/// Source backed by an in-memory dataset.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    dataset: Dataset,
}

impl InMemorySource {
    pub fn new(students: Vec<StudentRecord>, events: Vec<AttendanceEvent>) -> Self {
        Self {
            dataset: Dataset { students, events },
        }
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Loads a JSON dataset file.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            RollcallError::source_failure_with(
                format!("Failed to read dataset {}", path.display()),
                e,
            )
        })?;
        let dataset: Dataset = serde_json::from_str(&content)?;

        info!(
            path = %path.display(),
            students = dataset.students.len(),
            events = dataset.events.len(),
            "Loaded attendance dataset"
        );
        Ok(Self::from_dataset(dataset))
    }

    pub fn len(&self) -> usize {
        self.dataset.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.events.is_empty()
    }
}

#[async_trait]
impl AttendanceSource for InMemorySource {
    #[instrument(skip(self, query), fields(limit = query.limit))]
    async fn fetch_events(&self, query: &RecordQuery) -> Result<Vec<AttendanceEvent>> {
        let mut events: Vec<AttendanceEvent> = self
            .dataset
            .events
            .iter()
            .filter(|event| query.matches_event(event))
            .cloned()
            .collect();

        events.sort_by_key(|event| Reverse(event.timestamp));
        events.truncate(query.limit);

        debug!(matched = events.len(), "Fetched attendance events");
        Ok(events)
    }

    async fn count_students(&self, query: &RecordQuery) -> Result<u64> {
        let count = self
            .dataset
            .students
            .iter()
            .filter(|student| query.matches_student(student))
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TimeRange;
    use rollcall_common::test_utils::event_fixtures::{event, event_in};
    use rollcall_common::test_utils::mock_timestamp;
    use rollcall_common::AttendanceStatus::{Absent, Present};
    use rollcall_common::StudentId;
    use std::io::Write;

    fn query(limit: usize) -> RecordQuery {
        let filter = AnalyticsFilter {
            time_range: TimeRange::Week,
            ..AnalyticsFilter::default()
        };
        let range =
            ResolvedRange::resolve(&filter, mock_timestamp(2025, 1, 15, 12, 0, 0), chrono_tz::UTC)
                .unwrap();
        RecordQuery::new(&filter, &range, limit)
    }

    fn student(id: &str, department: Option<&str>) -> StudentRecord {
        StudentRecord {
            id: StudentId::from(id),
            department_id: department.map(str::to_string),
            course_id: None,
            section_id: None,
            year_level: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_filters_sorts_and_caps() {
        let source = InMemorySource::new(
            vec![],
            vec![
                event("s1", Present, mock_timestamp(2025, 1, 10, 9, 0, 0)),
                event("s1", Absent, mock_timestamp(2025, 1, 14, 9, 0, 0)),
                event("s2", Present, mock_timestamp(2025, 1, 12, 9, 0, 0)),
                // outside the window
                event("s3", Present, mock_timestamp(2024, 12, 1, 9, 0, 0)),
            ],
        );

        let events = source.fetch_events(&query(10)).await.unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].timestamp, mock_timestamp(2025, 1, 14, 9, 0, 0));
        assert_eq!(events[2].timestamp, mock_timestamp(2025, 1, 10, 9, 0, 0));

        let capped = source.fetch_events(&query(2)).await.unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[1].timestamp, mock_timestamp(2025, 1, 12, 9, 0, 0));
    }

    #[tokio::test]
    async fn test_department_filter_applies_to_events_and_roster() {
        let at = mock_timestamp(2025, 1, 14, 9, 0, 0);
        let source = InMemorySource::new(
            vec![
                student("s1", Some("dept-science")),
                student("s2", Some("dept-arts")),
                student("s3", None),
            ],
            vec![
                event_in("s1", "Science", Present, at),
                event_in("s2", "Arts", Present, at),
                event("s3", Present, at),
            ],
        );

        let mut q = query(100);
        assert_eq!(source.count_students(&q).await.unwrap(), 3);

        q.department_id = Some("dept-science".to_string());
        let events = source.fetch_events(&q).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].student_id, StudentId::from("s1"));
        assert_eq!(source.count_students(&q).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"students":[{{"id":"s1"}}],"events":[{{"id":"e1","status":"LATE","timestamp":"2025-01-14T08:00:00Z","studentId":"s1"}}]}}"#
        )
        .unwrap();

        let source = InMemorySource::from_json_file(file.path()).await.unwrap();
        assert_eq!(source.len(), 1);
        assert!(!source.is_empty());
        assert!(InMemorySource::default().is_empty());
        assert_eq!(source.count_students(&query(10)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_from_missing_file_is_source_error() {
        let err = InMemorySource::from_json_file("/no/such/dataset.json")
            .await
            .unwrap_err();
        assert!(matches!(err, RollcallError::Source { .. }));
    }
}
