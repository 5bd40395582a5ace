//! Administration: users and calendar assignment.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::palette;
use crate::tui::app::App;

pub fn render_admin(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[0]);

    render_users(frame, app, panes[0]);
    render_calendars(frame, app, panes[1]);

    let hint = if app.assigning_calendar {
        " ↑/↓: pick calendar   Enter: assign   Esc: cancel"
    } else {
        " ↑/↓: pick user   a: assign calendar   r: refresh"
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(palette::SLATE))),
        chunks[1],
    );
}

fn render_users(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(pane_style(!app.assigning_calendar))
        .title(" Users ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for (index, user) in app.users.iter().enumerate().take(usize::from(inner.height)) {
        let calendar = user
            .calendar_id
            .and_then(|id| app.calendars.iter().find(|c| c.id == id))
            .map(|c| c.name.as_str())
            .unwrap_or("unassigned");
        let row = format!(
            " {:<24} {:<10} {calendar}",
            user.display_name,
            user.role.label()
        );
        let style = if index == app.user_cursor {
            Style::default()
                .fg(palette::INK)
                .bg(palette::TEAL)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette::SILVER)
        };
        lines.push(Line::from(Span::styled(row, style)));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_calendars(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(pane_style(app.assigning_calendar))
        .title(" Calendars ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for (index, calendar) in app
        .calendars
        .iter()
        .enumerate()
        .take(usize::from(inner.height))
    {
        let row = format!(" {:<24} {}", calendar.name, calendar.timezone);
        let style = if app.assigning_calendar && index == app.calendar_cursor {
            Style::default()
                .fg(palette::INK)
                .bg(palette::TEAL)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette::SILVER)
        };
        lines.push(Line::from(Span::styled(row, style)));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn pane_style(active: bool) -> Style {
    if active {
        Style::default().fg(palette::TEAL)
    } else {
        Style::default().fg(palette::SLATE)
    }
}
