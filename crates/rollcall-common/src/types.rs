//! Attendance domain types shared by the analytics engine and its collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RollcallError;

/// Identifier of a student (the subject of attendance events).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Outcome of a single attendance scan or record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Excused,
}

impl AttendanceStatus {
    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Late => "LATE",
            Self::Absent => "ABSENT",
            Self::Excused => "EXCUSED",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PRESENT" => Ok(Self::Present),
            "LATE" => Ok(Self::Late),
            "ABSENT" => Ok(Self::Absent),
            "EXCUSED" => Ok(Self::Excused),
            other => Err(RollcallError::validation_field(
                format!("Unknown attendance status '{other}'"),
                "status",
            )),
        }
    }
}

/// Department attributes denormalized onto an event through its student.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRef {
    pub department_id: String,
    pub name: String,
    pub code: String,
}

/// One attendance record as delivered by the record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
    pub id: String,
    pub status: AttendanceStatus,
    pub timestamp: DateTime<Utc>,
    pub student_id: StudentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

impl AttendanceEvent {
    /// Creates an event with no department, course, section, year level or subject.
    pub fn new(
        id: impl Into<String>,
        student_id: impl Into<String>,
        status: AttendanceStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            status,
            timestamp,
            student_id: StudentId(student_id.into()),
            department: None,
            course_id: None,
            section_id: None,
            year_level: None,
            subject_id: None,
        }
    }

    /// Attaches department attributes.
    #[must_use]
    pub fn with_department(mut self, department: DepartmentRef) -> Self {
        self.department = Some(department);
        self
    }
}

/// Roster entry, used to count the students a query covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: StudentId,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub year_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&AttendanceStatus::Late).unwrap();
        assert_eq!(json, "\"LATE\"");

        let status: AttendanceStatus = serde_json::from_str("\"EXCUSED\"").unwrap();
        assert_eq!(status, AttendanceStatus::Excused);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("present".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Present);
        assert!("TARDY".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn test_event_deserializes_camel_case() {
        let json = r#"{
            "id": "evt-1",
            "status": "PRESENT",
            "timestamp": "2025-01-15T09:00:00Z",
            "studentId": "stu-1",
            "department": { "departmentId": "d1", "name": "Science", "code": "SCI" },
            "courseId": "c1"
        }"#;
        let event: AttendanceEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.student_id, StudentId::from("stu-1"));
        assert_eq!(event.timestamp, Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap());
        assert_eq!(event.department.as_ref().map(|d| d.code.as_str()), Some("SCI"));
        assert_eq!(event.course_id.as_deref(), Some("c1"));
        assert!(event.section_id.is_none());
    }
}
