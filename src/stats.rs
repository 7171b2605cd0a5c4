//! Task statistics and derived analytics.
//!
//! Everything here is a pure function of a task list. Rounding is left to
//! presentation code.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::fields::ProgressBand;
use crate::task::Task;

/// Number of tasks kept in `recent_tasks`.
pub const RECENT_TASK_LIMIT: usize = 5;

/// Weekly goal used when none has been saved.
pub const DEFAULT_WEEKLY_GOAL: f64 = 40.0;

/// Mapping from a categorical field value to summed hours.
pub type Distribution = BTreeMap<String, f64>;

/// Summary statistics over a task list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatistics {
    pub total_tasks: usize,
    pub total_hours: f64,
    pub active_subjects: usize,
    pub work_type_distribution: Distribution,
    pub subject_distribution: Distribution,
    /// Most recently added first.
    pub recent_tasks: Vec<Task>,
}

/// Compute statistics for `tasks` in a single pass.
pub fn compute_stats(tasks: &[Task]) -> TaskStatistics {
    let mut total_hours = 0.0;
    let mut subjects = BTreeSet::new();
    let mut work_type_distribution = Distribution::new();
    let mut subject_distribution = Distribution::new();

    for task in tasks {
        total_hours += task.hours;
        subjects.insert(task.subject.as_str());
        *work_type_distribution.entry(task.work_type.clone()).or_insert(0.0) += task.hours;
        *subject_distribution.entry(task.subject.clone()).or_insert(0.0) += task.hours;
    }

    let recent_tasks = tasks.iter().rev().take(RECENT_TASK_LIMIT).cloned().collect();

    TaskStatistics {
        total_tasks: tasks.len(),
        total_hours,
        active_subjects: subjects.len(),
        work_type_distribution,
        subject_distribution,
        recent_tasks,
    }
}

/// One row of the per-subject analytics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub name: String,
    pub hours: f64,
    pub task_count: usize,
}

/// Build the subject table from `stats`, asking `count` for each subject's task count.
pub fn subject_table(stats: &TaskStatistics, count: impl Fn(&str) -> usize) -> Vec<SubjectSummary> {
    stats
        .subject_distribution
        .iter()
        .map(|(name, &hours)| SubjectSummary {
            name: name.clone(),
            hours,
            task_count: count(name),
        })
        .collect()
}

/// Logged hours measured against a weekly goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyProgress {
    pub goal: f64,
    pub hours: f64,
    pub percent: f64,
    pub band: ProgressBand,
}

pub fn weekly_progress(hours: f64, goal: f64) -> WeeklyProgress {
    let percent = if goal > 0.0 { hours / goal * 100.0 } else { 0.0 };
    WeeklyProgress {
        goal,
        hours,
        percent,
        band: ProgressBand::from_percent(percent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn sample() -> Vec<Task> {
        vec![
            Task::new("Math", "Grading", 2.0, "2024-01-01"),
            Task::new("Physics", "Lecture", 1.25, "2024-01-02"),
            Task::new("math", "Lecture", 0.1, "2024-01-03"),
            Task::new("Math", "Research", 0.2, "2024-01-04"),
            Task::new("Chemistry", "Grading", 3.3, "2024-01-05"),
            Task::new("Physics", "Mentoring", 0.7, "2024-01-06"),
            Task::new("Math", "Lecture", 4.0, "2024-01-07"),
        ]
    }

    #[test]
    fn test_empty_list() {
        let stats = compute_stats(&[]);
        assert_eq!(stats, TaskStatistics::default());
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.total_hours, 0.0);
        assert_eq!(stats.active_subjects, 0);
        assert!(stats.work_type_distribution.is_empty());
        assert!(stats.subject_distribution.is_empty());
        assert!(stats.recent_tasks.is_empty());
    }

    #[test]
    fn test_totals_match_distributions() {
        let tasks = sample();
        let stats = compute_stats(&tasks);
        let sum: f64 = tasks.iter().map(|t| t.hours).sum();

        assert!((stats.total_hours - sum).abs() < EPS);
        let by_type: f64 = stats.work_type_distribution.values().sum();
        let by_subject: f64 = stats.subject_distribution.values().sum();
        assert!((by_type - stats.total_hours).abs() < EPS);
        assert!((by_subject - stats.total_hours).abs() < EPS);
    }

    #[test]
    fn test_active_subjects_is_case_sensitive() {
        let stats = compute_stats(&sample());
        // Math, math, Physics, Chemistry
        assert_eq!(stats.active_subjects, 4);
    }

    #[test]
    fn test_recent_tasks_capped_and_reversed() {
        let tasks = sample();
        let stats = compute_stats(&tasks);
        assert_eq!(stats.recent_tasks.len(), RECENT_TASK_LIMIT);
        assert_eq!(stats.recent_tasks[0], tasks[6]);
        assert_eq!(stats.recent_tasks[4], tasks[2]);

        let short = compute_stats(&tasks[..2]);
        assert_eq!(short.recent_tasks, vec![tasks[1].clone(), tasks[0].clone()]);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let tasks = sample();
        assert_eq!(compute_stats(&tasks), compute_stats(&tasks));
    }

    #[test]
    fn test_math_scenario() {
        let t1 = Task::new("Math", "Grading", 2.0, "2024-01-01");
        let t2 = Task::new("Math", "Lecture", 3.0, "2024-01-02");
        let stats = compute_stats(&[t1.clone(), t2.clone()]);

        assert_eq!(stats.total_tasks, 2);
        assert_eq!(stats.total_hours, 5.0);
        assert_eq!(stats.active_subjects, 1);
        assert_eq!(
            stats.work_type_distribution,
            Distribution::from([("Grading".to_string(), 2.0), ("Lecture".to_string(), 3.0)])
        );
        assert_eq!(stats.subject_distribution, Distribution::from([("Math".to_string(), 5.0)]));
        assert_eq!(stats.recent_tasks, vec![t2, t1]);
    }

    #[test]
    fn test_stats_json_shape() {
        let stats = compute_stats(&[Task::new("Math", "Grading", 2.0, "2024-01-01")]);
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["totalTasks"], 1);
        assert_eq!(value["activeSubjects"], 1);
        assert_eq!(value["workTypeDistribution"]["Grading"], 2.0);
        assert_eq!(value["recentTasks"][0]["workType"], "Grading");
    }

    #[test]
    fn test_subject_table() {
        let tasks = sample();
        let stats = compute_stats(&tasks);
        let table = subject_table(&stats, |s| tasks.iter().filter(|t| t.subject == s).count());
        let math = table.iter().find(|row| row.name == "Math").unwrap();
        assert_eq!(math.task_count, 3);
        assert!((math.hours - 6.2).abs() < EPS);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_weekly_progress_bands() {
        let p = weekly_progress(10.0, 40.0);
        assert_eq!(p.percent, 25.0);
        assert_eq!(p.band, ProgressBand::Low);
        assert_eq!(weekly_progress(20.0, 40.0).band, ProgressBand::Medium);
        assert_eq!(weekly_progress(28.0, 40.0).band, ProgressBand::High);
        assert_eq!(weekly_progress(5.0, 0.0).percent, 0.0);
    }
}
