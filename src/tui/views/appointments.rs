//! Upcoming appointments list.

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::models::AppointmentStatus;
use crate::palette;
use crate::tui::app::App;

pub fn render_appointments(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {} upcoming appointments", app.appointments.len()),
            Style::default()
                .fg(palette::SILVER)
                .add_modifier(Modifier::BOLD),
        )),
        chunks[0],
    );

    let visible = usize::from(chunks[1].height);
    app.appointment_view_rows = visible;
    app.appointment_scroll.follow(app.appointment_cursor, visible);
    let offset = app.appointment_scroll.offset();

    let mut lines = Vec::with_capacity(visible);
    for (index, appointment) in app
        .appointments
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
    {
        let starts = appointment
            .starts_at
            .with_timezone(&Local)
            .format("%a %d %b %H:%M");
        let reason = appointment.reason.as_deref().unwrap_or("—");
        let row = format!(
            " {starts}  {:<24}  {:<12}  {reason}",
            truncate(&appointment.patient.full_name, 24),
            appointment.status.label(),
        );

        let style = if index == app.appointment_cursor {
            Style::default()
                .fg(palette::INK)
                .bg(palette::TEAL)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(status_color(appointment.status))
        };
        lines.push(Line::from(Span::styled(row, style)));
    }
    frame.render_widget(Paragraph::new(lines), chunks[1]);

    frame.render_widget(
        Paragraph::new(Span::styled(
            " ↑/↓: move   Enter: open meeting   r: refresh",
            Style::default().fg(palette::SLATE),
        )),
        chunks[2],
    );
}

fn status_color(status: AppointmentStatus) -> ratatui::style::Color {
    match status {
        AppointmentStatus::Scheduled => palette::SILVER,
        AppointmentStatus::CheckedIn => palette::BLUE,
        AppointmentStatus::InProgress => palette::GREEN,
        AppointmentStatus::Completed => palette::SLATE,
        AppointmentStatus::Cancelled | AppointmentStatus::NoShow => palette::RED,
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
