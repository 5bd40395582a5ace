//! Video-meeting companion: chat on the left, patient summary on the right.

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::palette;
use crate::tui::app::App;

pub fn render_meeting(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(appointment) = app.active_appointment().cloned() else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                " No meeting open. Pick an appointment and press Enter.",
                Style::default().fg(palette::SLATE),
            )),
            area,
        );
        return;
    };

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    render_chat(frame, app, panes[0]);
    render_patient_card(frame, &appointment, panes[1]);
}

fn render_chat(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette::SLATE))
        .title(" Chat ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let visible = usize::from(chunks[0].height);
    app.chat_view_rows = visible;
    let total = app.chat_messages.len();
    // Stick to the latest messages unless scrolled back.
    app.chat_scroll.follow_end(total, visible);
    let offset = app.chat_scroll.offset();

    let mut lines = Vec::with_capacity(visible);
    for message in app.chat_messages.iter().skip(offset).take(visible) {
        let who_style = if message.from_patient {
            Style::default()
                .fg(palette::ORANGE)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(palette::TEAL)
                .add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::styled(
                message
                    .sent_at
                    .with_timezone(&Local)
                    .format("%H:%M ")
                    .to_string(),
                Style::default().fg(palette::SLATE),
            ),
            Span::styled(format!("{}: ", message.sender_name), who_style),
            Span::styled(message.body.clone(), Style::default().fg(palette::SNOW)),
        ]));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[0]);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(palette::TEAL)),
            Span::styled(app.chat_input.clone(), Style::default().fg(palette::SNOW)),
            Span::styled("▏", Style::default().fg(palette::TEAL)),
        ])),
        chunks[1],
    );
}

fn render_patient_card(frame: &mut Frame, appointment: &crate::models::Appointment, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette::SLATE))
        .title(" Patient ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let patient = &appointment.patient;
    let mut lines = vec![
        Line::from(Span::styled(
            patient.full_name.clone(),
            Style::default()
                .fg(palette::SNOW)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    if let Some(dob) = patient.date_of_birth {
        lines.push(detail("Born", dob.format("%Y-%m-%d").to_string()));
    }
    if let Some(phone) = patient.phone.as_ref() {
        lines.push(detail("Phone", phone.clone()));
    }
    if let Some(email) = patient.email.as_ref() {
        lines.push(detail("Email", email.clone()));
    }

    lines.push(Line::default());
    lines.push(detail(
        "Visit",
        format!(
            "{} ({})",
            appointment
                .starts_at
                .with_timezone(&Local)
                .format("%a %d %b %H:%M"),
            appointment.status.label()
        ),
    ));
    if let Some(reason) = appointment.reason.as_ref() {
        lines.push(detail("Reason", reason.clone()));
    }
    if let Some(url) = appointment.meeting_url.as_ref() {
        lines.push(detail("Video", url.clone()));
    }

    if !patient.notes.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Notes",
            Style::default().fg(palette::SLATE),
        )));
        for note in &patient.notes {
            lines.push(Line::from(Span::styled(
                format!("• {note}"),
                Style::default().fg(palette::SILVER),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn detail(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<7}"), Style::default().fg(palette::SLATE)),
        Span::styled(value, Style::default().fg(palette::SILVER)),
    ])
}
