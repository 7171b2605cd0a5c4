//! Color constants for the dashboard.

use ratatui::style::Color;

use crate::fields::ProgressBand;

/// Headings and bars
pub const ACCENT_BLUE: Color = Color::Rgb(59, 130, 246);
/// Progress below 30% of the weekly goal
pub const ALERT_RED: Color = Color::Rgb(239, 68, 68);
/// Progress below 70% of the weekly goal
pub const AMBER: Color = Color::Rgb(245, 158, 11);
/// Progress at or above 70% of the weekly goal
pub const EMERALD: Color = Color::Rgb(16, 185, 129);

pub fn band_color(band: ProgressBand) -> Color {
    match band {
        ProgressBand::Low => ALERT_RED,
        ProgressBand::Medium => AMBER,
        ProgressBand::High => EMERALD,
    }
}
