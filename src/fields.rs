//! Enumerations shared by the CLI, reports and dashboard.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Where a shared report is sent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ShareChannel {
    /// Today's tasks when there are any, WhatsApp-style bold markers.
    Whatsapp,
    /// All recent tasks, plain text.
    Email,
}

/// How far weekly hours are along the weekly goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    Low,
    Medium,
    High,
}

impl ProgressBand {
    pub fn from_percent(percent: f64) -> Self {
        if percent < 30.0 {
            ProgressBand::Low
        } else if percent < 70.0 {
            ProgressBand::Medium
        } else {
            ProgressBand::High
        }
    }
}

/// Format a progress band for display.
pub fn format_band(b: ProgressBand) -> &'static str {
    match b {
        ProgressBand::Low => "Behind",
        ProgressBand::Medium => "On Track",
        ProgressBand::High => "Strong",
    }
}

/// Task list ordering.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    /// Order logged.
    Logged,
    Date,
    Hours,
}
