//! Task data structure and related functionality.
//!
//! A `Task` is a single logged unit of faculty work. Tasks are identified by
//! their position in the log; they carry no id and are never edited in place.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// A logged unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub subject: String,
    pub work_type: String,
    /// Non-finite hours are written as `null` and read back as NaN.
    #[serde(deserialize_with = "hours_or_nan")]
    pub hours: f64,
    /// ISO date, optionally with a time component.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn hours_or_nan<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl Task {
    pub fn new(subject: &str, work_type: &str, hours: f64, date: &str) -> Self {
        Task {
            subject: subject.to_string(),
            work_type: work_type.to_string(),
            hours,
            date: date.to_string(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Calendar day of the task, ignoring any time component.
    pub fn day(&self) -> Option<NaiveDate> {
        let day = self.date.split('T').next().unwrap_or_default();
        NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").ok()
    }
}

/// Parse a work date: "today", "yesterday", "N days ago" or YYYY-MM-DD.
pub fn parse_date_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "today" => return Some(today),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }
    if let Some(n) = s.strip_suffix(" days ago").or_else(|| s.strip_suffix("d ago")) {
        if let Ok(days) = n.trim().parse::<i64>() {
            return Some(today - Duration::days(days));
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Criteria for narrowing the task log. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub subject: Option<String>,
    pub work_type: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Case-insensitive text searched in subject, work type and description.
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(ref s) = self.subject {
            if &task.subject != s {
                return false;
            }
        }
        if let Some(ref w) = self.work_type {
            if &task.work_type != w {
                return false;
            }
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(day) = task.day() else {
                return false;
            };
            if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
                return false;
            }
        }
        if let Some(ref needle) = self.search {
            let needle = needle.to_lowercase();
            let found = task.subject.to_lowercase().contains(&needle)
                || task.work_type.to_lowercase().contains(&needle)
                || task
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }
        true
    }
}

/// Check the fields a task must carry before it is logged.
///
/// The repository accepts anything; this is the gate callers run first.
pub fn validate(task: &Task) -> Result<()> {
    if task.subject.trim().is_empty() {
        return Err(Error::InvalidTask("subject is required".into()));
    }
    if task.work_type.trim().is_empty() {
        return Err(Error::InvalidTask("work type is required".into()));
    }
    if task.date.trim().is_empty() {
        return Err(Error::InvalidTask("date is required".into()));
    }
    if !task.hours.is_finite() || task.hours <= 0.0 {
        return Err(Error::InvalidTask(format!("hours must be a positive number, got {}", task.hours)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_hours_read_as_nan() {
        let json = r#"{"subject":"Math","workType":"Lecture","hours":null,"date":"2024-01-02"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.hours.is_nan());
        assert_eq!(task.subject, "Math");

        let written = serde_json::to_string(&Task::new("Math", "Lecture", f64::INFINITY, "2024-01-02")).unwrap();
        let back: Task = serde_json::from_str(&written).unwrap();
        assert!(back.hours.is_nan());
    }

    #[test]
    fn test_task_json_uses_camel_case() {
        let task = Task::new("Math", "Grading", 2.0, "2024-01-01");
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(json, r#"{"subject":"Math","workType":"Grading","hours":2.0,"date":"2024-01-01"}"#);

        let parsed: Task = serde_json::from_str(
            r#"{"subject":"Physics","workType":"Lecture","hours":1.5,"date":"2024-02-03","description":"Optics"}"#,
        )
        .unwrap();
        assert_eq!(parsed.work_type, "Lecture");
        assert_eq!(parsed.description.as_deref(), Some("Optics"));
    }

    #[test]
    fn test_day_ignores_time_component() {
        let task = Task::new("Math", "Grading", 1.0, "2024-03-05T10:30:00.000Z");
        assert_eq!(task.day(), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(Task::new("Math", "Grading", 1.0, "soon").day(), None);
    }

    #[test]
    fn test_parse_date_input() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(parse_date_input("today", today), Some(today));
        assert_eq!(parse_date_input("Yesterday", today), NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(parse_date_input("3 days ago", today), NaiveDate::from_ymd_opt(2024, 3, 7));
        assert_eq!(parse_date_input("2d ago", today), NaiveDate::from_ymd_opt(2024, 3, 8));
        assert_eq!(parse_date_input("2024-02-29", today), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_date_input("someday", today), None);
    }

    #[test]
    fn test_filter() {
        let lecture = Task::new("Math", "Lecture", 1.0, "2024-01-05").with_description("Linear algebra");
        let grading = Task::new("Physics", "Grading", 2.0, "2024-01-10");

        assert!(TaskFilter::default().matches(&lecture));

        let by_subject = TaskFilter { subject: Some("Math".into()), ..Default::default() };
        assert!(by_subject.matches(&lecture));
        assert!(!by_subject.matches(&grading));

        let by_range = TaskFilter {
            from: NaiveDate::from_ymd_opt(2024, 1, 6),
            to: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..Default::default()
        };
        assert!(!by_range.matches(&lecture));
        assert!(by_range.matches(&grading));

        let by_text = TaskFilter { search: Some("ALGEBRA".into()), ..Default::default() };
        assert!(by_text.matches(&lecture));
        assert!(!by_text.matches(&grading));
    }

    #[test]
    fn test_validate() {
        assert!(validate(&Task::new("Math", "Grading", 2.0, "2024-01-01")).is_ok());
        assert!(validate(&Task::new(" ", "Grading", 2.0, "2024-01-01")).is_err());
        assert!(validate(&Task::new("Math", "", 2.0, "2024-01-01")).is_err());
        assert!(validate(&Task::new("Math", "Grading", 2.0, "")).is_err());
        assert!(validate(&Task::new("Math", "Grading", 0.0, "2024-01-01")).is_err());
        assert!(validate(&Task::new("Math", "Grading", -1.0, "2024-01-01")).is_err());
        assert!(validate(&Task::new("Math", "Grading", f64::NAN, "2024-01-01")).is_err());
    }
}
