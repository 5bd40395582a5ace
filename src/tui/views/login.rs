//! Sign-in screen.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::palette;
use crate::tui::app::App;

pub fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let box_width = 46.min(area.width);
    let box_height = 10.min(area.height);
    let form_area = Rect {
        x: area.x + (area.width.saturating_sub(box_width)) / 2,
        y: area.y + (area.height.saturating_sub(box_height)) / 2,
        width: box_width,
        height: box_height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette::TEAL))
        .title(" Sign in to Cura ");
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    let field_style = |focused: bool| {
        if focused {
            Style::default()
                .fg(palette::SNOW)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette::SILVER)
        }
    };

    let email = Line::from(vec![
        Span::styled("Email    ", Style::default().fg(palette::SLATE)),
        Span::styled(app.login.email.clone(), field_style(!app.login.focus_password)),
        cursor_span(!app.login.focus_password),
    ]);
    let password = Line::from(vec![
        Span::styled("Password ", Style::default().fg(palette::SLATE)),
        Span::styled(
            "*".repeat(app.login.password.chars().count()),
            field_style(app.login.focus_password),
        ),
        cursor_span(app.login.focus_password),
    ]);

    frame.render_widget(Paragraph::new(email), rows[1]);
    frame.render_widget(Paragraph::new(password), rows[2]);

    if let Some(error) = app.login.error.as_ref() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                error.clone(),
                Style::default().fg(palette::RED),
            )),
            rows[4],
        );
    }

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Tab: switch field   Enter: sign in   Ctrl+C: quit",
            Style::default().fg(palette::SLATE),
        )),
        rows[5],
    );
}

fn cursor_span(focused: bool) -> Span<'static> {
    if focused {
        Span::styled("▏", Style::default().fg(palette::TEAL))
    } else {
        Span::raw("")
    }
}
