use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const WEEK_COUNT: u8 = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressAggregate {
    pub days_completed: u32,
    pub hours_logged: f64,
    pub tasks_completed: u32,
    pub projects_done: u32,
    #[serde(deserialize_with = "percentages")]
    pub week_progress: BTreeMap<String, u8>,
}

impl Default for ProgressAggregate {
    fn default() -> Self {
        let week_progress = (1..=WEEK_COUNT)
            .map(|week| (format!("week{week}"), 0))
            .collect();
        Self {
            days_completed: 0,
            hours_logged: 0.0,
            tasks_completed: 0,
            projects_done: 0,
            week_progress,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub date: String,
    pub hours: f64,
    pub notes: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Backup document. Every section is optional on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressAggregate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<LogEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskItem>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_instant"
    )]
    pub export_date: Option<DateTime<Utc>>,
}

/// Week percentages may be fractional in older backups. Any number is rounded
/// and clamped into 0..=100; non-numeric values count as 0.
fn percentages<'de, D>(deserializer: D) -> Result<BTreeMap<String, u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(week, value)| {
            let percentage = value
                .as_f64()
                .filter(|number| number.is_finite())
                .map_or(0, |number| number.round().clamp(0.0, 100.0) as u8);
            (week, percentage)
        })
        .collect())
}

/// Informational only; an unreadable value is dropped rather than failing the document.
fn optional_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
        .map(|instant| instant.with_timezone(&Utc)))
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogDraft {
    pub date: String,
    pub hours: f64,
    pub notes: String,
}

/// Form submission for a log. Hours arrive as text so a blank field
/// reaches validation instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct LogForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct WeekProgressRequest {
    pub percentage: i64,
}

#[derive(Debug, Deserialize)]
pub struct WeekProgressForm {
    #[serde(default)]
    pub percentage: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub week: String,
    pub percentage: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineRow {
    pub week: String,
    pub percentage: u8,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub progress: ProgressAggregate,
    pub chart: Vec<ChartPoint>,
    pub timeline: Vec<TimelineRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fractional_week_values_are_rounded_and_clamped() {
        let progress: ProgressAggregate = serde_json::from_value(json!({
            "daysCompleted": 4,
            "weekProgress": { "week1": 45.5, "week2": 120, "week3": -3, "week4": "n/a", "week5": 70 }
        }))
        .unwrap();

        assert_eq!(progress.days_completed, 4);
        assert_eq!(progress.week_progress["week1"], 46);
        assert_eq!(progress.week_progress["week2"], 100);
        assert_eq!(progress.week_progress["week3"], 0);
        assert_eq!(progress.week_progress["week4"], 0);
        assert_eq!(progress.week_progress["week5"], 70);
    }

    #[test]
    fn unreadable_export_date_is_dropped() {
        let bundle: StateBundle =
            serde_json::from_value(json!({ "tasks": [], "exportDate": "2024-01-03" })).unwrap();
        assert_eq!(bundle.export_date, None);
        assert_eq!(bundle.tasks, Some(Vec::new()));

        let bundle: StateBundle =
            serde_json::from_value(json!({ "exportDate": "2024-01-03T12:00:00.000Z" })).unwrap();
        assert!(bundle.export_date.is_some());
    }
}
