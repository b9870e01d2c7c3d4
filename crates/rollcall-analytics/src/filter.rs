//! Request filters: raw query parameters and their validated form.

use crate::bucket::Granularity;
use chrono::{Datelike, NaiveDate};
use rollcall_common::{Result, RollcallError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// Preset analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Today,
    Week,
    #[default]
    Month,
    Quarter,
    Year,
    Custom,
}

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Today => "today",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Quarter => "quarter",
            TimeRange::Year => "year",
            TimeRange::Custom => "custom",
        }
    }

    /// Bucket granularity used by every time-bucketed view.
    pub fn granularity(self) -> Granularity {
        match self {
            TimeRange::Today => Granularity::Hourly,
            TimeRange::Week | TimeRange::Month | TimeRange::Custom => Granularity::Daily,
            TimeRange::Quarter => Granularity::Weekly,
            TimeRange::Year => Granularity::Monthly,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "today" => Ok(TimeRange::Today),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            "year" => Ok(TimeRange::Year),
            "custom" => Ok(TimeRange::Custom),
            other => Err(RollcallError::validation_field(
                format!("Unknown time range '{other}'; expected today, week, month, quarter, year or custom"),
                "timeRange",
            )),
        }
    }
}

/// Four-tier attendance risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Classifies an attendance rate in percent.
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 90.0 {
            RiskLevel::None
        } else if rate >= 75.0 {
            RiskLevel::Low
        } else if rate >= 50.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::None => "none",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(RiskLevel::None),
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(RollcallError::validation_field(
                format!("Unknown risk level '{other}'; expected none, low, medium or high"),
                "riskLevel",
            )),
        }
    }
}

/// Query parameters exactly as received on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    #[serde(rename = "type")]
    pub analytics_type: Option<String>,
    pub time_range: Option<String>,
    pub no_cache: Option<String>,
    pub department_id: Option<String>,
    pub risk_level: Option<String>,
    pub subject_id: Option<String>,
    pub course_id: Option<String>,
    pub section_id: Option<String>,
    pub year_level: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Validated request filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalyticsFilter {
    /// Accepted for compatibility; only part of the cache key.
    pub analytics_type: Option<String>,
    pub time_range: TimeRange,
    pub no_cache: bool,
    pub department_id: Option<String>,
    pub risk_level: Option<RiskLevel>,
    pub subject_id: Option<String>,
    pub course_id: Option<String>,
    pub section_id: Option<String>,
    pub year_level: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl AnalyticsQuery {
    /// Validates every parameter. Empty strings count as absent.
    pub fn into_filter(self) -> Result<AnalyticsFilter> {
        let time_range = match non_empty(self.time_range) {
            Some(raw) => raw.parse()?,
            None => TimeRange::default(),
        };

        let risk_level = non_empty(self.risk_level)
            .map(|raw| raw.parse::<RiskLevel>())
            .transpose()?;

        let no_cache = match non_empty(self.no_cache).as_deref() {
            None | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(RollcallError::validation_field(
                    format!("Invalid noCache value '{other}'; expected 0, 1, true or false"),
                    "noCache",
                ))
            }
        };

        let start_date = parse_date(non_empty(self.start_date), "startDate")?;
        let end_date = parse_date(non_empty(self.end_date), "endDate")?;

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(RollcallError::validation_field(
                    format!("startDate {start} is after endDate {end}"),
                    "startDate",
                ));
            }
        }

        if time_range == TimeRange::Custom && (start_date.is_none() || end_date.is_none()) {
            return Err(RollcallError::validation_field(
                "Custom time range requires both startDate and endDate",
                "timeRange",
            ));
        }

        Ok(AnalyticsFilter {
            analytics_type: non_empty(self.analytics_type),
            time_range,
            no_cache,
            department_id: non_empty(self.department_id),
            risk_level,
            subject_id: non_empty(self.subject_id),
            course_id: non_empty(self.course_id),
            section_id: non_empty(self.section_id),
            year_level: non_empty(self.year_level),
            start_date,
            end_date,
        })
    }
}

impl AnalyticsFilter {
    /// Cache key built from every filter parameter except `noCache`.
    pub fn signature(&self) -> String {
        fn opt(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("")
        }

        let dates = |date: Option<NaiveDate>| date.map(|d| d.to_string()).unwrap_or_default();

        [
            opt(&self.analytics_type).to_string(),
            self.time_range.as_str().to_string(),
            opt(&self.department_id).to_string(),
            self.risk_level.map(|r| r.as_str()).unwrap_or("").to_string(),
            opt(&self.subject_id).to_string(),
            opt(&self.course_id).to_string(),
            opt(&self.section_id).to_string(),
            opt(&self.year_level).to_string(),
            dates(self.start_date),
            dates(self.end_date),
        ]
        .join("|")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (its date part is used).
/// Years outside 1..=9999 are rejected.
fn parse_date(value: Option<String>, field: &str) -> Result<Option<NaiveDate>> {
    let Some(raw) = value else {
        return Ok(None);
    };

    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(&raw).map(|dt| dt.date_naive()))
        .map_err(|_| {
            RollcallError::validation_field(format!("Malformed date '{raw}' for {field}"), field)
        })?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(RollcallError::validation_field(
            format!("Date '{raw}' for {field} must fall within years {MIN_YEAR} to {MAX_YEAR}"),
            field,
        ));
    }

    Ok(Some(date))
}
