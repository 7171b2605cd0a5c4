//! Analytics dashboard for the terminal user interface.
//!
//! The dashboard owns the task repository for its lifetime and subscribes to
//! it; any mutation marks the view dirty and the next frame recomputes the
//! statistics.

use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Row, Table},
    Frame, Terminal,
};
use tracing::debug;

use crate::fields::format_band;
use crate::report::{format_hours, truncate};
use crate::repository::{SubscriptionId, TaskRepository};
use crate::stats::{subject_table, weekly_progress, TaskStatistics};
use crate::store::{set_weekly_goal, weekly_goal, KeyValueStore};
use crate::tui::colors::{band_color, ACCENT_BLUE, ALERT_RED};
use crate::tui::utils::centered_rect;

/// Step used by the `+` and `-` keys.
const GOAL_STEP: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum DashboardState {
    Overview,
    ConfirmClear,
}

pub struct DashboardApp<S: KeyValueStore> {
    repo: TaskRepository<S>,
    subscription: SubscriptionId,
    dirty: Rc<Cell<bool>>,
    stats: TaskStatistics,
    goal: f64,
    state: DashboardState,
    status_message: String,
}

impl<S: KeyValueStore> DashboardApp<S> {
    pub fn new(mut repo: TaskRepository<S>) -> Self {
        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        let subscription = repo.subscribe(move |_| flag.set(true));

        let mut app = DashboardApp {
            repo,
            subscription,
            dirty,
            stats: TaskStatistics::default(),
            goal: 0.0,
            state: DashboardState::Overview,
            status_message: String::new(),
        };
        app.sync();
        app
    }

    /// Recompute derived data if the repository changed since the last frame.
    fn sync(&mut self) {
        if self.dirty.replace(false) {
            debug!(version = self.repo.version(), "refreshing dashboard statistics");
            self.stats = self.repo.get_task_stats();
        }
        self.goal = weekly_goal(self.repo.store());
    }

    fn adjust_goal(&mut self, delta: f64) {
        let goal = (self.goal + delta).max(GOAL_STEP);
        match set_weekly_goal(self.repo.store_mut(), goal) {
            Ok(()) => self.status_message = format!("Weekly goal set to {}", format_hours(goal)),
            Err(e) => self.status_message = format!("Failed to save weekly goal: {e}"),
        }
    }

    /// Apply one key press. Returns true when the dashboard should close.
    fn handle_key(&mut self, key: KeyCode) -> bool {
        self.status_message.clear();
        match self.state {
            DashboardState::Overview => match key {
                KeyCode::Char('q') | KeyCode::Esc => return true,
                KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_goal(GOAL_STEP),
                KeyCode::Char('-') => self.adjust_goal(-GOAL_STEP),
                KeyCode::Char('c') if !self.repo.is_empty() => self.state = DashboardState::ConfirmClear,
                _ => {}
            },
            DashboardState::ConfirmClear => {
                match key {
                    KeyCode::Char('y') | KeyCode::Char('Y') => {
                        let count = self.repo.len();
                        self.status_message = match self.repo.clear_tasks() {
                            Ok(()) => format!("Cleared {} task(s)", count),
                            Err(e) => format!("Cleared tasks but failed to save: {e}"),
                        };
                    }
                    _ => self.status_message = "Clear cancelled".to_string(),
                }
                self.state = DashboardState::Overview;
            }
        }
        false
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code));
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let header = Paragraph::new(Line::from(vec![Span::styled(
            "WORKFOLIO ANALYTICS",
            Style::default().add_modifier(Modifier::BOLD),
        )]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White));
        f.render_widget(header, area);
    }

    /// Render the summary cards and the weekly progress gauge.
    fn render_summary(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(40),
            ])
            .split(area);

        let cards = [
            ("Total Tasks", self.stats.total_tasks.to_string()),
            ("Total Hours", format_hours(self.stats.total_hours)),
            ("Active Subjects", self.stats.active_subjects.to_string()),
        ];
        for (i, (title, value)) in cards.into_iter().enumerate() {
            let card = Paragraph::new(Span::styled(value, Style::default().add_modifier(Modifier::BOLD)))
                .block(Block::default().borders(Borders::ALL).title(title))
                .alignment(Alignment::Center);
            f.render_widget(card, chunks[i]);
        }

        let progress = weekly_progress(self.stats.total_hours, self.goal);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Weekly Goal"))
            .gauge_style(Style::default().fg(band_color(progress.band)))
            .ratio((progress.percent / 100.0).clamp(0.0, 1.0))
            .label(format!(
                "{:.0}% of {} ({})",
                progress.percent,
                format_hours(progress.goal),
                format_band(progress.band)
            ));
        f.render_widget(gauge, chunks[3]);
    }

    fn render_work_types(&self, f: &mut Frame, area: Rect) {
        let bars: Vec<Bar> = self
            .stats
            .work_type_distribution
            .iter()
            .map(|(name, hours)| {
                Bar::default()
                    .label(Line::from(truncate(name, 12)))
                    .value((hours * 10.0).round() as u64)
                    .text_value(format_hours(*hours))
            })
            .collect();

        let chart = BarChart::default()
            .block(Block::default().borders(Borders::ALL).title("Hours by Work Type"))
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .bar_style(Style::default().fg(ACCENT_BLUE))
            .value_style(Style::default().fg(Color::White))
            .data(BarGroup::default().bars(&bars));
        f.render_widget(chart, area);
    }

    fn render_subjects(&self, f: &mut Frame, area: Rect) {
        let rows: Vec<Row> = subject_table(&self.stats, |s| self.repo.get_task_count_by_subject(s))
            .into_iter()
            .map(|row| Row::new(vec![row.name, format_hours(row.hours), row.task_count.to_string()]))
            .collect();

        let table = Table::new(
            rows,
            [Constraint::Min(12), Constraint::Length(8), Constraint::Length(6)],
        )
        .header(
            Row::new(vec!["Subject", "Hours", "Tasks"])
                .style(Style::default().add_modifier(Modifier::BOLD).fg(ACCENT_BLUE)),
        )
        .block(Block::default().borders(Borders::ALL).title("Subjects"));
        f.render_widget(table, area);
    }

    fn render_recent(&self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = if self.stats.recent_tasks.is_empty() {
            vec![ListItem::new("No tasks logged yet.")]
        } else {
            self.stats
                .recent_tasks
                .iter()
                .map(|t| {
                    ListItem::new(Line::from(vec![
                        Span::styled(format!("{:<12}", t.date), Style::default().fg(Color::Gray)),
                        Span::styled(format!("{:<18}", truncate(&t.subject, 18)), Style::default().add_modifier(Modifier::BOLD)),
                        Span::raw(format!("{:<14}", truncate(&t.work_type, 14))),
                        Span::raw(format!("{:>7}  ", format_hours(t.hours))),
                        Span::styled(t.description.clone().unwrap_or_default(), Style::default().fg(Color::Gray)),
                    ]))
                })
                .collect()
        };
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Recent Tasks"));
        f.render_widget(list, area);
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);
        let text = format!("Delete all {} logged task(s)? (y/n)", self.repo.len());
        let confirm = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Confirm"))
            .alignment(Alignment::Center)
            .style(Style::default().bg(ALERT_RED));
        f.render_widget(confirm, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if self.status_message.is_empty() {
            "q quit | +/- weekly goal | c clear tasks".to_string()
        } else {
            self.status_message.clone()
        };
        let status = Paragraph::new(text).style(Style::default().bg(ACCENT_BLUE).fg(Color::White));
        f.render_widget(status, area);
    }

    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Summary cards
                Constraint::Min(6),    // Charts
                Constraint::Length(8), // Recent tasks
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_summary(f, chunks[1]);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[2]);
        self.render_work_types(f, middle[0]);
        self.render_subjects(f, middle[1]);

        self.render_recent(f, chunks[3]);
        if self.state == DashboardState::ConfirmClear {
            self.render_confirm(f, chunks[2]);
        }
        self.render_status_bar(f, chunks[4]);
    }

    /// Main event loop for the dashboard.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.sync();
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        self.repo.unsubscribe(self.subscription);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::stats::DEFAULT_WEEKLY_GOAL;
    use crate::store::MemoryStore;
    use crate::task::Task;

    fn app_with_tasks() -> DashboardApp<MemoryStore> {
        let mut repo = TaskRepository::initialize(MemoryStore::new());
        repo.add_task(Task::new("Math", "Grading", 2.0, "2024-01-01")).unwrap();
        repo.add_task(Task::new("Physics", "Lecture", 3.0, "2024-01-02").with_description("Optics")).unwrap();
        DashboardApp::new(repo)
    }

    #[test]
    fn test_initial_stats_come_from_subscription() {
        let app = app_with_tasks();
        assert_eq!(app.stats.total_tasks, 2);
        assert_eq!(app.goal, DEFAULT_WEEKLY_GOAL);
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut app = app_with_tasks();

        assert!(!app.handle_key(KeyCode::Char('c')));
        assert_eq!(app.state, DashboardState::ConfirmClear);
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.repo.len(), 2);

        app.handle_key(KeyCode::Char('c'));
        app.handle_key(KeyCode::Char('y'));
        app.sync();
        assert!(app.repo.is_empty());
        assert_eq!(app.stats, TaskStatistics::default());
        assert_eq!(app.state, DashboardState::Overview);
    }

    #[test]
    fn test_goal_keys_persist() {
        let mut app = app_with_tasks();
        app.handle_key(KeyCode::Char('+'));
        app.sync();
        assert_eq!(app.goal, DEFAULT_WEEKLY_GOAL + GOAL_STEP);
        assert_eq!(weekly_goal(app.repo.store()), DEFAULT_WEEKLY_GOAL + GOAL_STEP);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn test_renders_without_panicking() {
        let mut app = app_with_tasks();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();

        app.handle_key(KeyCode::Char('c'));
        terminal.draw(|f| app.render(f)).unwrap();
    }
}
