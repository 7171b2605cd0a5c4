use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Faculty work log with analytics, shareable reports and an admin ledger.
/// Storage defaults to ~/.workfolio/store.json or a path passed via --store.
#[derive(Parser)]
#[command(name = "workfolio", version, about = "Faculty work logging and analytics")]
pub struct Cli {
    /// Path to the key-value store file.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Path to the faculty directory JSON file.
    #[arg(long, global = true)]
    pub faculty: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
