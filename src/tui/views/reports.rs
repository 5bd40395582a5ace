//! Reporting dashboard: summary cards and appointments-per-day chart.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
};

use crate::palette;
use crate::tui::app::App;

pub fn render_reports(frame: &mut Frame, app: &App, area: Rect) {
    let Some(report) = app.report.as_ref() else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                " Loading report… (r to refresh)",
                Style::default().fg(palette::SLATE),
            )),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ])
        .split(chunks[0]);

    render_card(
        frame,
        cards[0],
        "Appointments",
        report.total_appointments.to_string(),
        palette::TEAL,
    );
    render_card(
        frame,
        cards[1],
        "Completed",
        report.completed.to_string(),
        palette::GREEN,
    );
    render_card(
        frame,
        cards[2],
        "Cancelled",
        report.cancelled.to_string(),
        palette::ORANGE,
    );
    render_card(
        frame,
        cards[3],
        "No-shows",
        report.no_shows.to_string(),
        palette::RED,
    );
    render_card(
        frame,
        cards[4],
        "Avg length",
        format!("{:.0} min", report.average_duration_minutes),
        palette::BLUE,
    );

    let bars: Vec<Bar> = report
        .per_day
        .iter()
        .map(|daily| {
            Bar::default()
                .label(Line::from(daily.date.format("%d").to_string()))
                .value(u64::from(daily.count))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette::SLATE))
                .title(" Appointments per day "),
        )
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(palette::TEAL))
        .value_style(
            Style::default()
                .fg(palette::INK)
                .bg(palette::TEAL)
                .add_modifier(Modifier::BOLD),
        )
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, chunks[1]);
}

fn render_card(frame: &mut Frame, area: Rect, title: &str, value: String, color: ratatui::style::Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette::SLATE))
        .title(format!(" {title} "));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .centered(),
        inner,
    );
}
