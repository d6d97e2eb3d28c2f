use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::io::Stdout;

use crate::core::model::{last_active, Recommendation};
use crate::core::profile::{MatchSummary, ProfileView};
use crate::core::r#loop::Frontend;
use crate::core::state::KeyBindings;

pub const NO_ONE_NEW: &str = "There's no one new around you.";
const LOADING: &str = "Loading...";

/// Puts the terminal back the way we found it.
pub struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
    }
}

pub struct TerminalFrontend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    keys: KeyBindings,
}

impl TerminalFrontend {
    /// Switches to raw mode on the alternate screen. Keep the guard alive
    /// for as long as the frontend is drawing.
    pub fn enter(keys: KeyBindings) -> Result<(Self, TerminalGuard)> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = TerminalGuard;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        Ok((Self { terminal, keys }, guard))
    }
}

impl Frontend for TerminalFrontend {
    fn draw(&mut self, view: &ProfileView) -> Result<()> {
        let keys = &self.keys;
        self.terminal.draw(|frame| paint(frame, Some(view), keys))?;
        Ok(())
    }

    fn draw_loading(&mut self) -> Result<()> {
        let keys = &self.keys;
        self.terminal.draw(|frame| paint(frame, None, keys))?;
        Ok(())
    }
}

/// Lays out one frame. `None` means nothing has been polled yet.
pub fn paint(frame: &mut Frame, view: Option<&ProfileView>, keys: &KeyBindings) {
    let outer = Block::default().borders(Borders::ALL).title(" kindling ");
    let inner = outer.inner(frame.area());
    frame.render_widget(outer, frame.area());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3), Constraint::Length(1)])
        .split(inner);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(rows[0]);

    let now = Utc::now();
    let today = now.date_naive();
    let profile_text = match view {
        None => vec![Line::from(LOADING)],
        Some(v) => match &v.top {
            Some(rec) => recommendation_lines(rec, today),
            None => vec![Line::from(NO_ONE_NEW)],
        },
    };
    let profile = Paragraph::new(profile_text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Profile"));
    frame.render_widget(profile, top[0]);

    render_matches(frame, top[1], view, now);
    render_buttons(frame, rows[1], keys);

    let status =
        Paragraph::new(status_line(view, keys)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, rows[2]);
}

fn render_matches(frame: &mut Frame, area: Rect, view: Option<&ProfileView>, now: DateTime<Utc>) {
    let mut items: Vec<ListItem> = view
        .map(|v| v.matches.iter().map(|m| ListItem::new(match_line(m, now))).collect())
        .unwrap_or_default();
    if items.is_empty() {
        items.push(ListItem::new("(no matches yet)"));
    }
    let title = match view {
        Some(v) => format!("Matches ({})", v.match_count),
        None => "Matches".to_string(),
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

/// `name (messages) last-active last-message`, skipping what is unknown.
fn match_line(m: &MatchSummary, now: DateTime<Utc>) -> Line<'static> {
    let mut spans = vec![
        Span::styled(m.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" ({})", m.message_count)),
    ];
    if let Some(active) = last_active(&m.ping_time, now) {
        spans.push(Span::styled(format!(" {}", active), Style::default().fg(Color::DarkGray)));
    }
    if let Some(last) = &m.last_message {
        spans.push(Span::styled(format!(" {}", last), Style::default().fg(Color::Gray)));
    }
    Line::from(spans)
}

fn render_buttons(frame: &mut Frame, area: Rect, keys: &KeyBindings) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Fill(1), Constraint::Length(9), Constraint::Fill(1)])
        .split(area);
    let button = |label: String, color: Color| {
        Paragraph::new(label)
            .alignment(Alignment::Center)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL))
    };
    frame.render_widget(button(format!("X [{}]", keys.reject), Color::Red), cols[0]);
    frame.render_widget(button("i".to_string(), Color::Blue), cols[1]);
    frame.render_widget(button(format!("<3 [{}]", keys.accept), Color::Green), cols[2]);
}

pub fn recommendation_lines(rec: &Recommendation, today: NaiveDate) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            headline(rec, today),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("{} miles away", rec.distance_mi)),
        Line::from(""),
    ];
    lines.extend(rec.bio.lines().map(|l| Line::from(l.to_string())));
    lines
}

pub fn headline(rec: &Recommendation, today: NaiveDate) -> String {
    match rec.age_on(today) {
        Some(age) => format!("{}, {}", rec.name, age),
        None => rec.name.clone(),
    }
}

pub fn status_line(view: Option<&ProfileView>, keys: &KeyBindings) -> String {
    let hints = format!("[{}] pass  [{}] like  [{}] quit", keys.reject, keys.accept, keys.quit);
    match view {
        Some(v) => format!("matches: {}  in deck: {}  {}", v.match_count, v.queue_len, hints),
        None => hints,
    }
}
