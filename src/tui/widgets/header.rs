//! Header bar: screen tabs on the left, signed-in user on the right.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use crate::palette;
use crate::tui::app::{App, Screen};

const TABS: &[Screen] = &[
    Screen::Schedule,
    Screen::Appointments,
    Screen::Meeting,
    Screen::Admin,
    Screen::Reports,
];

pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " cura ",
            Style::default()
                .fg(palette::SNOW)
                .bg(palette::TEAL)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    for screen in TABS {
        let style = if app.screen == *screen {
            Style::default()
                .fg(palette::TEAL)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette::SLATE)
        };
        spans.push(Span::styled(format!(" {} ", screen.label()), style));
    }

    let right = match app.session.as_ref() {
        Some(session) => {
            let user = session.user();
            let calendar = app
                .active_calendar()
                .map(|c| format!("  [{}]", c.name))
                .unwrap_or_default();
            format!("{} ({}){calendar} ", user.display_name, user.role.label())
        }
        None => String::new(),
    };

    let left_width: usize = spans.iter().map(|s| s.content.width()).sum();
    let pad = usize::from(area.width)
        .saturating_sub(left_width)
        .saturating_sub(right.width());
    spans.push(Span::raw(" ".repeat(pad)));
    spans.push(Span::styled(right, Style::default().fg(palette::SILVER)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
