//! Report rendering: shareable summaries, the weekly report, CSV export and
//! the task table printed by the CLI.

use chrono::{Datelike, Duration, NaiveDate};

use crate::fields::ShareChannel;
use crate::stats::{compute_stats, TaskStatistics};
use crate::task::Task;

/// Sunday-to-Saturday week containing `today`.
pub fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
    (start, start + Duration::days(6))
}

/// Tasks dated inside the week containing `today`. Undated tasks are skipped.
pub fn tasks_in_week(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    let (start, end) = week_bounds(today);
    tasks
        .iter()
        .filter(|t| t.day().is_some_and(|d| d >= start && d <= end))
        .collect()
}

pub fn format_hours(hours: f64) -> String {
    format!("{:.1}h", hours)
}

fn format_task_date(task: &Task) -> String {
    match task.day() {
        Some(d) => d.format("%b %-d, %Y").to_string(),
        None => task.date.clone(),
    }
}

/// Build the shareable summary of the recent tasks in `stats`.
///
/// WhatsApp messages focus on today's tasks when any exist and mark headings
/// with `*`; email messages list every recent task in plain text.
pub fn format_share_message(stats: &TaskStatistics, name: &str, today: NaiveDate, channel: ShareChannel) -> String {
    let logged_today: Vec<&Task> = stats
        .recent_tasks
        .iter()
        .filter(|t| t.day() == Some(today))
        .collect();
    let today_only = channel == ShareChannel::Whatsapp && !logged_today.is_empty();
    let shared: Vec<&Task> = if today_only {
        logged_today
    } else {
        stats.recent_tasks.iter().collect()
    };

    let mut message = String::from("*WorkFolio Tasks Report*\n\n");
    message.push_str(&format!("*Date:* {}\n", today.format("%A, %B %-d, %Y")));
    message.push_str(&format!("*Faculty:* {}\n", name));
    message.push_str(&format!("*Total Tasks:* {}\n", stats.total_tasks));
    message.push_str(&format!("*Total Hours:* {}\n\n", format_hours(stats.total_hours)));

    if shared.is_empty() {
        message.push_str("No tasks logged yet.\n");
    } else {
        message.push_str(if today_only { "*Today's Tasks:*\n\n" } else { "*Recent Tasks:*\n\n" });
        for (i, task) in shared.iter().enumerate() {
            message.push_str(&format!("*{}. {}* ({})\n", i + 1, task.subject, task.work_type));
            // Per-task hours keep their full precision; only totals are rounded.
            message.push_str(&format!("   {} | {}h\n", format_task_date(task), task.hours));
            if let Some(desc) = task.description.as_deref().filter(|d| !d.is_empty()) {
                message.push_str(&format!("   {}\n", desc));
            }
            message.push('\n');
        }
        let shown: f64 = shared.iter().map(|t| t.hours).sum();
        message.push_str(&format!("*Displayed Tasks Hours:* {}\n", format_hours(shown)));
    }
    message.push_str("\n*Shared from WorkFolio*\n");

    match channel {
        ShareChannel::Whatsapp => message,
        ShareChannel::Email => message.replace('*', ""),
    }
}

/// Link that opens `message` in the channel's app.
pub fn share_url(channel: ShareChannel, message: &str, today: NaiveDate) -> String {
    match channel {
        ShareChannel::Whatsapp => format!("https://wa.me/?text={}", urlencoding::encode(message)),
        ShareChannel::Email => {
            let subject = format!("WorkFolio Tasks Report - {}", today.format("%b %-d, %Y"));
            format!(
                "mailto:?subject={}&body={}",
                urlencoding::encode(&subject),
                urlencoding::encode(message)
            )
        }
    }
}

/// Plain-text weekly report: overall summary plus the tasks logged this week.
pub fn format_weekly_report(tasks: &[Task], name: &str, today: NaiveDate) -> String {
    let stats = compute_stats(tasks);
    let (start, end) = week_bounds(today);
    let weekly = tasks_in_week(tasks, today);

    let mut out = String::new();
    out.push_str("WorkFolio Weekly Report\n");
    out.push_str(&format!("{} - {}\n", start.format("%b %-d"), end.format("%b %-d, %Y")));
    out.push_str(&format!("Faculty: {}\n\n", name));
    out.push_str("Summary\n");
    out.push_str(&format!("  {:<16} {}\n", "Total Tasks", stats.total_tasks));
    out.push_str(&format!("  {:<16} {}\n", "Total Hours", format_hours(stats.total_hours)));
    out.push_str(&format!("  {:<16} {}\n\n", "Active Subjects", stats.active_subjects));

    out.push_str(&format!("Weekly Tasks ({})\n", weekly.len()));
    if weekly.is_empty() {
        out.push_str("  No tasks logged this week.\n");
    } else {
        out.push_str(&format!(
            "  {:<16} {:<14} {:<12} {:>6}  {}\n",
            "Subject", "Work Type", "Date", "Hours", "Description"
        ));
        for t in &weekly {
            out.push_str(&format!(
                "  {:<16} {:<14} {:<12} {:>6}  {}\n",
                truncate(&t.subject, 16),
                truncate(&t.work_type, 14),
                t.day().map(|d| d.to_string()).unwrap_or_else(|| t.date.clone()),
                format_hours(t.hours),
                t.description.as_deref().unwrap_or("-")
            ));
        }
        let hours: f64 = weekly.iter().map(|t| t.hours).sum();
        out.push_str(&format!("\n  Hours this week: {}\n", format_hours(hours)));
    }

    if !stats.recent_tasks.is_empty() {
        out.push_str("\nRecent Tasks\n");
        for t in &stats.recent_tasks {
            out.push_str(&format!(
                "  {:<16} {:<14} {:<12} {:>6}\n",
                truncate(&t.subject, 16),
                truncate(&t.work_type, 14),
                format_task_date(t),
                format_hours(t.hours)
            ));
        }
    }
    out
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render tasks as CSV with a header row.
pub fn export_csv(tasks: &[&Task]) -> String {
    let mut csv = String::from("Subject,WorkType,Hours,Date,Description\n");
    for t in tasks {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            escape_csv(&t.subject),
            escape_csv(&t.work_type),
            t.hours,
            escape_csv(&t.date),
            escape_csv(t.description.as_deref().unwrap_or(""))
        ));
    }
    csv
}

/// Print tasks in a formatted table, numbered by their position in the log.
pub fn print_table(rows: &[(usize, &Task)]) {
    println!(
        "{:<5} {:<12} {:<18} {:<14} {:>7}  {}",
        "#", "Date", "Subject", "Work Type", "Hours", "Description"
    );
    for (pos, t) in rows {
        println!(
            "{:<5} {:<12} {:<18} {:<14} {:>7}  {}",
            pos + 1,
            truncate(&t.date, 12),
            truncate(&t.subject, 18),
            truncate(&t.work_type, 14),
            format_hours(t.hours),
            t.description.as_deref().unwrap_or("-")
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
