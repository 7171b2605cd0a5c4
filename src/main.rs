//! # Workfolio - faculty work log
//!
//! A command-line work log for faculty members, with task analytics,
//! shareable reports, an admin payroll ledger and an optional terminal
//! dashboard.
//!
//! ## Key Features
//!
//! - **Task Log**: record subject, work type, hours, date and a description
//! - **Analytics**: totals, hours by work type and subject, weekly goal progress
//! - **Sharing**: WhatsApp / email report messages with ready-to-open links
//! - **Admin Ledger**: faculty directory lookup, salary rate, appraisals, payments and reviews
//! - **Local Storage**: one JSON key-value file, written atomically
//!
//! ## Quick Start
//!
//! ```bash
//! # Log two hours of grading for today
//! workfolio log Math Grading 2
//!
//! # Totals and distributions
//! workfolio stats
//!
//! # Share today's work
//! workfolio share --channel whatsapp --name "Dr. Rao"
//!
//! # Live dashboard
//! workfolio ui
//! ```
//!
//! Data is stored in `~/.workfolio/store.json`; the faculty directory is read
//! from `~/.workfolio/faculty.json`. Set `RUST_LOG=debug` for diagnostics.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod admin;
pub mod cache;
pub mod cli;
pub mod cmd;
pub mod error;
pub mod faculty;
pub mod fields;
pub mod report;
pub mod repository;
pub mod stats;
pub mod store;
pub mod task;
pub mod tui {
    pub mod colors;
    pub mod dashboard;
    pub mod run;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use repository::TaskRepository;
use store::FileStore;

/// Log filter from `RUST_LOG` directives, `warn` when unset or invalid.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn main() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    // Determine the data directory
    let data_dir = {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".workfolio")
    };
    let store_path = cli.store.clone().unwrap_or_else(|| data_dir.join("store.json"));
    let faculty_path = cli.faculty.clone().unwrap_or_else(|| data_dir.join("faculty.json"));

    if let Some(dir) = store_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Failed to create data directory {}: {}", dir.display(), e);
            std::process::exit(1);
        }
    }

    let mut store = FileStore::open(&store_path);
    tracing::debug!(store = %store.path().display(), faculty = %faculty_path.display(), "resolved data paths");

    let command = match cli.command {
        Commands::Admin { action } => {
            cmd_admin(&mut store, &faculty_path, action);
            return;
        }
        command => command,
    };

    let mut repo = TaskRepository::initialize(store);

    match command {
        Commands::Admin { .. } => unreachable!("admin commands handled above"),
        Commands::Completions { .. } => unreachable!("completions handled above"),

        Commands::Log { subject, work_type, hours, date, desc } =>
            cmd_log(&mut repo, subject, work_type, hours, date, desc),

        Commands::List { subject, work_type, from, to, search, sort, limit } =>
            cmd_list(&repo, subject, work_type, from, to, search, sort, limit),

        Commands::Stats => cmd_stats(&repo),

        Commands::Count { subject } => cmd_count(&repo, &subject),

        Commands::Clear => cmd_clear(&mut repo),

        Commands::Analytics { goal } => cmd_analytics(&mut repo, goal),

        Commands::Share { channel, name } => cmd_share(&repo, channel, name),

        Commands::Report { name } => cmd_report(&repo, name),

        Commands::Export { output, subject } => cmd_export(&repo, output, subject),

        Commands::Ui => cmd_ui(repo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_honours_rust_log() {
        assert_eq!(log_filter(Some("debug")).to_string(), "debug");
        assert_eq!(log_filter(Some("workfolio=trace")).to_string(), "workfolio=trace");
    }

    #[test]
    fn test_log_filter_defaults_to_warn() {
        assert_eq!(log_filter(None).to_string(), "warn");
        assert_eq!(log_filter(Some("  ")).to_string(), "warn");
    }
}
