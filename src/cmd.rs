//! Command implementations for the CLI interface.
//!
//! Task commands run against a `TaskRepository`; admin commands run against
//! the raw store and the faculty directory.

use std::fs;
use std::path::Path;

use chrono::Local;
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::admin::AdminLedger;
use crate::faculty::{faculty_name, find_faculty, load_faculty, Faculty, JsonFileDirectory};
use crate::fields::*;
use crate::report::*;
use crate::repository::TaskRepository;
use crate::stats::{subject_table, weekly_progress};
use crate::store::{set_weekly_goal, weekly_goal, KeyValueStore};
use crate::task::{parse_date_input, validate, Task, TaskFilter};
use crate::tui::run::run_dashboard;

#[derive(Subcommand)]
pub enum Commands {
    /// Log a unit of work.
    Log {
        /// Subject taught or supported.
        subject: String,
        /// Kind of work, e.g. Lecture, Grading, Research.
        work_type: String,
        /// Hours spent.
        hours: f64,
        /// Work date: YYYY-MM-DD, "today", "yesterday" or "N days ago".
        #[arg(long, default_value = "today")]
        date: String,
        /// Optional description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// List logged tasks with optional filters.
    List {
        /// Filter by exact subject.
        #[arg(long)]
        subject: Option<String>,
        /// Filter by exact work type.
        #[arg(long)]
        work_type: Option<String>,
        /// Earliest work date (inclusive).
        #[arg(long)]
        from: Option<String>,
        /// Latest work date (inclusive).
        #[arg(long)]
        to: Option<String>,
        /// Case-insensitive text search.
        #[arg(long)]
        search: Option<String>,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::Logged)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show totals, hour distributions and recent tasks.
    Stats,

    /// Count tasks logged for a subject (exact, case-sensitive).
    Count {
        subject: String,
    },

    /// Delete every logged task.
    Clear,

    /// Weekly goal progress and the per-subject table.
    Analytics {
        /// Save a new weekly goal in hours.
        #[arg(long)]
        goal: Option<f64>,
    },

    /// Build a shareable report message and link.
    Share {
        #[arg(long, value_enum, default_value_t = ShareChannel::Whatsapp)]
        channel: ShareChannel,
        /// Faculty name shown in the report.
        #[arg(long)]
        name: Option<String>,
    },

    /// Print the weekly report.
    Report {
        /// Faculty name shown in the report.
        #[arg(long)]
        name: Option<String>,
    },

    /// Export tasks to CSV format.
    Export {
        /// Output file path (default: tasks.csv)
        #[arg(long, short)]
        output: Option<String>,
        /// Filter by subject
        #[arg(long)]
        subject: Option<String>,
    },

    /// Faculty lookup, salary, appraisals and reviews.
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Launch the analytics dashboard.
    Ui,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// List the faculty directory.
    Faculty,
    /// Show one faculty member with appraisal and payment status.
    Show {
        id: u64,
    },
    /// Submit a work review for a faculty member.
    Review {
        id: u64,
        text: String,
    },
    /// Save an appraisal amount for a faculty member.
    Appraise {
        id: u64,
        amount: f64,
    },
    /// Show or set the salary rate per hour.
    Rate {
        rate: Option<f64>,
    },
    /// Pay owed to every faculty member.
    Payroll,
    /// Mark a faculty member as paid.
    Pay {
        id: u64,
    },
    /// Show payments, appraisals, salary rate changes and reviews.
    History,
}

const DEFAULT_NAME: &str = "Faculty";

fn parse_date_or_exit(s: &str) -> chrono::NaiveDate {
    let today = Local::now().date_naive();
    match parse_date_input(s, today) {
        Some(d) => d,
        None => {
            eprintln!("Invalid date '{}'. Use YYYY-MM-DD, \"today\", \"yesterday\" or \"N days ago\".", s);
            std::process::exit(1);
        }
    }
}

/// Validate and log a new task.
pub fn cmd_log<S: KeyValueStore>(
    repo: &mut TaskRepository<S>,
    subject: String,
    work_type: String,
    hours: f64,
    date: String,
    desc: Option<String>,
) {
    let date = parse_date_or_exit(&date);
    let mut task = Task::new(subject.trim(), work_type.trim(), hours, &date.to_string());
    if let Some(d) = desc.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        task = task.with_description(d);
    }
    if let Err(e) = validate(&task) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    if let Err(e) = repo.add_task(task) {
        eprintln!("Failed to save tasks: {e}");
        std::process::exit(1);
    }
    println!("Logged task {}", repo.len());
}

/// List tasks with optional filtering and sorting.
pub fn cmd_list<S: KeyValueStore>(
    repo: &TaskRepository<S>,
    subject: Option<String>,
    work_type: Option<String>,
    from: Option<String>,
    to: Option<String>,
    search: Option<String>,
    sort: SortKey,
    limit: Option<usize>,
) {
    let filter = TaskFilter {
        subject,
        work_type,
        from: from.as_deref().map(parse_date_or_exit),
        to: to.as_deref().map(parse_date_or_exit),
        search,
    };

    let mut rows: Vec<(usize, &Task)> = repo
        .tasks()
        .iter()
        .enumerate()
        .filter(|(_, t)| filter.matches(t))
        .collect();

    match sort {
        SortKey::Logged => {}
        SortKey::Date => rows.sort_by(|a, b| a.1.date.cmp(&b.1.date).then(a.0.cmp(&b.0))),
        SortKey::Hours => rows.sort_by(|a, b| b.1.hours.total_cmp(&a.1.hours).then(a.0.cmp(&b.0))),
    }

    if let Some(n) = limit {
        rows.truncate(n);
    }

    if rows.is_empty() {
        println!("No tasks found.");
        return;
    }
    print_table(&rows);
    let hours: f64 = rows.iter().map(|(_, t)| t.hours).sum();
    println!("\n{} task(s), {}", rows.len(), format_hours(hours));
}

/// Print summary statistics.
pub fn cmd_stats<S: KeyValueStore>(repo: &TaskRepository<S>) {
    let stats = repo.get_task_stats();
    println!("Total tasks:     {}", stats.total_tasks);
    println!("Total hours:     {}", format_hours(stats.total_hours));
    println!("Active subjects: {}", stats.active_subjects);

    if !stats.work_type_distribution.is_empty() {
        println!("\nHours by work type:");
        for (work_type, hours) in &stats.work_type_distribution {
            println!("  {:<20} {:>8}", truncate(work_type, 20), format_hours(*hours));
        }
    }
    if !stats.subject_distribution.is_empty() {
        println!("\nHours by subject:");
        for (subject, hours) in &stats.subject_distribution {
            println!("  {:<20} {:>8}", truncate(subject, 20), format_hours(*hours));
        }
    }
    if !stats.recent_tasks.is_empty() {
        println!("\nRecent tasks:");
        for t in &stats.recent_tasks {
            println!("  {:<12} {:<18} {:<14} {:>7}", t.date, truncate(&t.subject, 18), truncate(&t.work_type, 14), format_hours(t.hours));
        }
    }
}

pub fn cmd_count<S: KeyValueStore>(repo: &TaskRepository<S>, subject: &str) {
    println!("{}", repo.get_task_count_by_subject(subject));
}

pub fn cmd_clear<S: KeyValueStore>(repo: &mut TaskRepository<S>) {
    let count = repo.len();
    if let Err(e) = repo.clear_tasks() {
        eprintln!("Failed to save tasks: {e}");
        std::process::exit(1);
    }
    println!("Cleared {} task(s)", count);
}

/// Show weekly progress and the subject table, optionally saving a new goal.
pub fn cmd_analytics<S: KeyValueStore>(repo: &mut TaskRepository<S>, goal: Option<f64>) {
    if let Some(goal) = goal {
        if let Err(e) = set_weekly_goal(repo.store_mut(), goal) {
            eprintln!("Failed to save weekly goal: {e}");
            std::process::exit(1);
        }
        println!("Weekly goal set to {}", format_hours(goal));
    }

    let stats = repo.get_task_stats();
    let progress = weekly_progress(stats.total_hours, weekly_goal(repo.store()));
    println!(
        "Weekly progress: {:.2}% ({} of {}) [{}]",
        progress.percent,
        format_hours(progress.hours),
        format_hours(progress.goal),
        format_band(progress.band)
    );

    let table = subject_table(&stats, |s| repo.get_task_count_by_subject(s));
    if table.is_empty() {
        println!("\nNo subjects yet.");
        return;
    }
    println!("\n{:<20} {:>8} {:>6}", "Subject", "Hours", "Tasks");
    for row in table {
        println!("{:<20} {:>8} {:>6}", truncate(&row.name, 20), format_hours(row.hours), row.task_count);
    }
}

pub fn cmd_share<S: KeyValueStore>(repo: &TaskRepository<S>, channel: ShareChannel, name: Option<String>) {
    let today = Local::now().date_naive();
    let name = name.unwrap_or_else(|| DEFAULT_NAME.to_string());
    let stats = repo.get_task_stats();
    let message = format_share_message(&stats, &name, today, channel);
    println!("{}", message);
    println!("{}", share_url(channel, &message, today));
}

pub fn cmd_report<S: KeyValueStore>(repo: &TaskRepository<S>, name: Option<String>) {
    let today = Local::now().date_naive();
    let name = name.unwrap_or_else(|| DEFAULT_NAME.to_string());
    print!("{}", format_weekly_report(repo.tasks(), &name, today));
}

/// Export tasks to a CSV file.
pub fn cmd_export<S: KeyValueStore>(repo: &TaskRepository<S>, output: Option<String>, subject: Option<String>) {
    let output_path = output.unwrap_or_else(|| "tasks.csv".to_string());
    let tasks: Vec<&Task> = repo
        .tasks()
        .iter()
        .filter(|t| subject.as_deref().map_or(true, |s| t.subject == s))
        .collect();

    match fs::write(&output_path, export_csv(&tasks)) {
        Ok(()) => println!("Exported {} tasks to {}", tasks.len(), output_path),
        Err(e) => {
            eprintln!("Failed to write CSV file: {}", e);
            std::process::exit(1);
        }
    }
}

pub fn cmd_ui<S: KeyValueStore>(repo: TaskRepository<S>) {
    if let Err(e) = run_dashboard(repo) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

fn faculty_or_exit(list: &[Faculty], id: u64) -> Faculty {
    match find_faculty(list, id) {
        Some(f) => f.clone(),
        None => {
            eprintln!("{}", crate::error::Error::FacultyNotFound(id));
            std::process::exit(1);
        }
    }
}

/// Handle admin commands.
pub fn cmd_admin<S: KeyValueStore>(store: &mut S, faculty_path: &Path, action: AdminAction) {
    let directory = JsonFileDirectory::new(faculty_path);
    let list = load_faculty(&directory, store);
    let mut ledger = AdminLedger::new(store);

    let result = match action {
        AdminAction::Faculty => {
            if list.is_empty() {
                println!("No faculty records available.");
            }
            for f in &list {
                println!(
                    "{:<5} {:<24} {:<18} {:>8}",
                    f.id,
                    truncate(&f.name, 24),
                    truncate(f.department.as_deref().unwrap_or("-"), 18),
                    format_hours(f.hours)
                );
            }
            Ok(())
        }
        AdminAction::Show { id } => {
            let f = faculty_or_exit(&list, id);
            println!("ID:          {}", f.id);
            println!("Name:        {}", f.name);
            println!("Department:  {}", f.department.as_deref().unwrap_or("-"));
            println!("Designation: {}", f.designation.as_deref().unwrap_or("-"));
            println!("Email:       {}", f.email.as_deref().unwrap_or("-"));
            println!("Hours:       {}", format_hours(f.hours));
            println!("Appraisal:   {:.2}", ledger.appraisal_for(f.id));
            println!("Paid:        {}", if ledger.is_paid(f.id) { "yes" } else { "no" });
            Ok(())
        }
        AdminAction::Review { id, text } => {
            let f = faculty_or_exit(&list, id);
            ledger.submit_review(&f, &text).map(|r| {
                println!("Review for {} submitted ({} characters)", r.faculty_name, r.review_length);
            })
        }
        AdminAction::Appraise { id, amount } => {
            let f = faculty_or_exit(&list, id);
            ledger.set_appraisal(&f, amount).map(|_| {
                println!("Appraisal of {:.2} saved for {}", amount, f.name);
            })
        }
        AdminAction::Rate { rate: Some(rate) } => ledger.set_salary_rate(rate).map(|_| {
            println!("Salary set to {:.2} per hour", rate);
        }),
        AdminAction::Rate { rate: None } => {
            println!("{:.2} per hour", ledger.salary_rate());
            Ok(())
        }
        AdminAction::Payroll => {
            println!("{:<5} {:<24} {:>8} {:>10} {:>12} {:<4}", "ID", "Name", "Hours", "Appraisal", "Total Pay", "Paid");
            for entry in ledger.payroll(&list) {
                println!(
                    "{:<5} {:<24} {:>8} {:>10.2} {:>12.2} {:<4}",
                    entry.faculty.id,
                    truncate(&entry.faculty.name, 24),
                    format_hours(entry.faculty.hours),
                    entry.appraisal,
                    entry.total_pay,
                    if entry.paid { "yes" } else { "no" }
                );
            }
            Ok(())
        }
        AdminAction::Pay { id } => {
            let f = faculty_or_exit(&list, id);
            ledger.mark_paid(&f).map(|record| {
                println!("Payment of {:.2} recorded for {}", record.amount, record.faculty_name);
            })
        }
        AdminAction::History => {
            let payments = ledger.payment_history();
            println!("Payments ({}):", payments.len());
            for p in &payments {
                println!(
                    "  {}  {:<24} {:>12.2}",
                    p.timestamp.format("%Y-%m-%d %H:%M"),
                    truncate(faculty_name(&list, p.faculty_id), 24),
                    p.amount
                );
            }
            let appraisals = ledger.appraisal_history();
            println!("\nAppraisals ({}):", appraisals.len());
            for a in &appraisals {
                println!(
                    "  {}  {:<24} {:>12.2}",
                    a.timestamp.format("%Y-%m-%d %H:%M"),
                    truncate(faculty_name(&list, a.faculty_id), 24),
                    a.amount
                );
            }
            let changes = ledger.salary_changes();
            println!("\nSalary rate changes ({}):", changes.len());
            for c in &changes {
                println!("  {}  {:.2} per hour", c.timestamp.format("%Y-%m-%d %H:%M"), c.new_rate);
            }
            let reviews = ledger.reviews();
            println!("\nReviews ({}):", reviews.len());
            for r in &reviews {
                println!(
                    "  {}  {:<24} {}",
                    r.timestamp.format("%Y-%m-%d %H:%M"),
                    truncate(faculty_name(&list, r.faculty_id), 24),
                    r.review_text
                );
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
