//! Week schedule grid with drag-selection of time blocks.

use chrono::Duration;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::palette;
use crate::tui::app::{App, GridGeometry, ordered_block_union};
use crate::utils::day_column_header;

const TIME_LABEL_WIDTH: u16 = 7;

pub fn render_schedule(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // day headers
            Constraint::Min(1),    // grid
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_title(frame, app, chunks[0]);

    let days: Vec<_> = (0..7).map(|i| app.week_start + Duration::days(i)).collect();
    let rows = ordered_block_union(&app.availability);

    if rows.is_empty() {
        app.grid_geometry = None;
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No availability for this week.",
                Style::default().fg(palette::SLATE),
            )),
            chunks[2],
        );
        render_footer(frame, app, chunks[3]);
        return;
    }

    let col_width = ((chunks[1].width.saturating_sub(TIME_LABEL_WIDTH)) / 7).max(4);

    // Day header row.
    let mut header_spans = vec![Span::raw(" ".repeat(usize::from(TIME_LABEL_WIDTH)))];
    for day in &days {
        let label = day_column_header(*day);
        header_spans.push(Span::styled(
            pad_to(&label, col_width),
            Style::default()
                .fg(palette::SILVER)
                .add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(header_spans)), chunks[1]);

    // Grid rows.
    let visible = usize::from(chunks[2].height);
    let offset = app.grid_scroll.offset().min(rows.len().saturating_sub(1));
    let mut lines = Vec::with_capacity(visible);
    for label in rows.iter().skip(offset).take(visible) {
        let mut spans = vec![Span::styled(
            pad_to(label, TIME_LABEL_WIDTH),
            Style::default().fg(palette::SLATE),
        )];
        for day in &days {
            spans.push(cell_span(app, *day, label, col_width));
        }
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines), chunks[2]);

    app.grid_geometry = Some(GridGeometry {
        area: Rect {
            x: chunks[2].x + TIME_LABEL_WIDTH,
            y: chunks[2].y,
            width: col_width * 7,
            height: chunks[2].height,
        },
        days,
        rows,
        row_offset: offset,
        col_width,
    });

    render_footer(frame, app, chunks[3]);
}

fn cell_span(app: &App, day: chrono::NaiveDate, label: &str, width: u16) -> Span<'static> {
    let available = app.is_block_available(day, label);
    let selected = available && app.selection.is_cell_selected(day, label);

    let (text, style) = if selected {
        (
            pad_to("█", width).replace(' ', "█"),
            Style::default().fg(palette::TEAL),
        )
    } else if available {
        (pad_to("·", width), Style::default().fg(palette::SILVER))
    } else {
        (pad_to(" ", width), Style::default().fg(palette::INK))
    };
    Span::styled(text, style)
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let calendar = app
        .active_calendar()
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "no calendar".to_string());
    let title = format!(
        " {calendar} — week of {}   [←/→] week  [c] calendar  [drag] block time",
        app.week_start.format("%Y-%m-%d")
    );
    frame.render_widget(
        Paragraph::new(Span::styled(title, Style::default().fg(palette::SILVER))),
        area,
    );
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.pending_range.as_ref() {
        Some(range) => Line::from(vec![
            Span::styled(
                format!(
                    " Block {} {} – {} ",
                    range.date, range.start_time, range.end_time
                ),
                Style::default()
                    .fg(palette::INK)
                    .bg(palette::YELLOW)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "  Enter: save   Esc: clear",
                Style::default().fg(palette::SLATE),
            ),
        ]),
        None => Line::from(Span::styled(
            " Drag across available slots to block time off.",
            Style::default().fg(palette::SLATE),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn pad_to(text: &str, width: u16) -> String {
    let width = usize::from(width);
    let mut out = String::with_capacity(width);
    out.push_str(text);
    while out.chars().count() < width {
        out.push(' ');
    }
    out.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_to_fills_and_truncates() {
        assert_eq!(pad_to("09:00", 7), "09:00  ");
        assert_eq!(pad_to("too-long-label", 4), "too-");
    }

    #[test]
    fn span_labels_render_end_times() {
        assert_eq!(crate::utils::block_span_label("09:30", 45), "09:30 – 10:15");
    }
}
