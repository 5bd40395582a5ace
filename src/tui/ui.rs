//! TUI event loop and rendering logic for the Cura client.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::Span,
    widgets::Paragraph,
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::client::ApiClient;
use crate::config::{Config, save_api_token};
use crate::logging;
use crate::models::NotificationEvent;
use crate::notifications::{self, NotificationHandle};
use crate::palette;
use crate::session::AuthSession;
use crate::tui::app::{App, Screen};
use crate::tui::scrolling::ScrollDirection;
use crate::tui::views;
use crate::tui::widgets::render_header;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Connection state built up after sign-in.
struct Backend {
    client: Option<ApiClient>,
    /// Notification stream; the handle aborts the task on drop, so
    /// replacing or dropping this tears the listener down with it.
    notifications: Option<(NotificationHandle, UnboundedReceiver<NotificationEvent>)>,
}

/// Run the interactive TUI event loop.
pub async fn run_tui(config: &Config) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let mut backend_state = Backend {
        client: None,
        notifications: None,
    };

    // An existing token skips the login screen if it still works.
    if let Some(token) = config.api_token.clone() {
        match resume_session(config, &token).await {
            Ok((client, session)) => {
                app.session = Some(session);
                app.screen = Screen::Schedule;
                connect(&mut app, &mut backend_state, config, client).await;
            }
            Err(err) => {
                logging::warn(format!("Stored token rejected: {err}"));
                app.login.error = Some("Session expired, sign in again".to_string());
            }
        }
    }

    let result = run_event_loop(&mut terminal, &mut app, &mut backend_state, config).await;

    // Restore the terminal before surfacing any error.
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn resume_session(config: &Config, token: &str) -> Result<(ApiClient, AuthSession)> {
    let client = ApiClient::with_token(config, token)?;
    let user = client.current_user().await?;
    Ok((client.clone(), AuthSession::new(token.to_string(), user)))
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    backend: &mut Backend,
    config: &Config,
) -> Result<()> {
    loop {
        drain_notifications(app, backend);
        app.drain_selection_updates();

        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(app, backend, config, key).await;
                }
                Event::Mouse(mouse) => handle_mouse_event(app, mouse),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

// === Rendering ===

fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.screen {
        Screen::Login => views::render_login(frame, app, chunks[1]),
        Screen::Schedule => views::render_schedule(frame, app, chunks[1]),
        Screen::Appointments => views::render_appointments(frame, app, chunks[1]),
        Screen::Meeting => views::render_meeting(frame, app, chunks[1]),
        Screen::Admin => views::render_admin(frame, app, chunks[1]),
        Screen::Reports => views::render_reports(frame, app, chunks[1]),
    }

    let status = app
        .status_message
        .clone()
        .unwrap_or_else(|| " Tab: next screen   Ctrl+C: quit".to_string());
    frame.render_widget(
        Paragraph::new(Span::styled(status, Style::default().fg(palette::SLATE))),
        chunks[2],
    );
}

// === Notifications ===

fn drain_notifications(app: &mut App, backend: &mut Backend) {
    let Some((_, rx)) = backend.notifications.as_mut() else {
        return;
    };
    while let Ok(event) = rx.try_recv() {
        match event {
            NotificationEvent::AppointmentCreated { appointment } => {
                app.status_message = Some(format!(
                    " New appointment: {}",
                    appointment.patient.full_name
                ));
                app.upsert_appointment(appointment);
            }
            NotificationEvent::AppointmentUpdated { appointment } => {
                app.status_message =
                    Some(format!(" Updated: {}", appointment.patient.full_name));
                app.upsert_appointment(appointment);
            }
            NotificationEvent::AppointmentCancelled { appointment_id } => {
                app.status_message = Some(" Appointment cancelled".to_string());
                app.remove_appointment(appointment_id);
            }
            NotificationEvent::ChatMessage { message } => {
                let in_open_meeting = app
                    .active_appointment()
                    .is_some_and(|a| a.id == message.appointment_id);
                if in_open_meeting {
                    app.chat_messages.push(message);
                } else {
                    app.status_message =
                        Some(format!(" Message from {}", message.sender_name));
                }
            }
            NotificationEvent::Ping => {}
        }
    }
}

// === Mouse ===

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
            let direction = if mouse.kind == MouseEventKind::ScrollUp {
                ScrollDirection::Up
            } else {
                ScrollDirection::Down
            };
            let delta = app.mouse_scroll.on_scroll(direction);
            scroll_active_view(app, delta);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if app.screen == Screen::Schedule
                && let Some((day, label)) = grid_cell_at(app, mouse)
            {
                app.selection.press(day, &label);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if app.screen == Screen::Schedule
                && let Some((day, label)) = grid_cell_at(app, mouse)
            {
                app.selection.extend(day, &label);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            // Release anywhere ends the gesture, including outside the
            // grid; the highlight stays until cleared or replaced.
            app.selection.release();
        }
        _ => {}
    }
}

/// Hit-test a mouse position against the schedule grid, keeping cells that
/// are not bookable on that day inert.
fn grid_cell_at(app: &App, mouse: MouseEvent) -> Option<(chrono::NaiveDate, String)> {
    let geometry = app.grid_geometry.as_ref()?;
    let (day, label) = geometry.cell_at(mouse.column, mouse.row)?;
    if !app.is_block_available(day, label) {
        return None;
    }
    Some((day, label.to_string()))
}

fn scroll_active_view(app: &mut App, delta: i32) {
    match app.screen {
        Screen::Schedule => {
            let total = app
                .grid_geometry
                .as_ref()
                .map_or(0, |geometry| geometry.rows.len());
            let visible = app
                .grid_geometry
                .as_ref()
                .map_or(1, |geometry| usize::from(geometry.area.height));
            app.grid_scroll.scroll_by(delta, total, visible);
        }
        Screen::Appointments => {
            let total = app.appointments.len();
            app.appointment_scroll
                .scroll_by(delta, total, app.appointment_view_rows.max(1));
        }
        Screen::Meeting => {
            let total = app.chat_messages.len();
            app.chat_scroll
                .scroll_by(delta, total, app.chat_view_rows.max(1));
        }
        _ => {}
    }
}

// === Keys ===

async fn handle_key(app: &mut App, backend: &mut Backend, config: &Config, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Tab cycles screens once signed in, everywhere except the login form.
    if key.code == KeyCode::Tab && app.screen != Screen::Login {
        app.screen = next_screen(app);
        return;
    }

    match app.screen {
        Screen::Login => handle_login_key(app, backend, config, key).await,
        Screen::Schedule => handle_schedule_key(app, backend, key).await,
        Screen::Appointments => handle_appointments_key(app, backend, key).await,
        Screen::Meeting => handle_meeting_key(app, backend, key).await,
        Screen::Admin => handle_admin_key(app, backend, key).await,
        Screen::Reports => {
            if key.code == KeyCode::Char('r') {
                load_report(app, backend).await;
            }
        }
    }
}

fn next_screen(app: &App) -> Screen {
    let is_admin = app.session.as_ref().is_some_and(AuthSession::is_admin);
    match app.screen {
        Screen::Schedule => Screen::Appointments,
        Screen::Appointments => Screen::Meeting,
        Screen::Meeting if is_admin => Screen::Admin,
        Screen::Meeting => Screen::Reports,
        Screen::Admin => Screen::Reports,
        Screen::Reports | Screen::Login => Screen::Schedule,
    }
}

async fn handle_login_key(app: &mut App, backend: &mut Backend, config: &Config, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::BackTab => {
            app.login.focus_password = !app.login.focus_password;
        }
        KeyCode::Backspace => {
            let field = if app.login.focus_password {
                &mut app.login.password
            } else {
                &mut app.login.email
            };
            field.pop();
        }
        KeyCode::Char(c) => {
            let field = if app.login.focus_password {
                &mut app.login.password
            } else {
                &mut app.login.email
            };
            field.push(c);
        }
        KeyCode::Enter => sign_in(app, backend, config).await,
        _ => {}
    }
}

async fn handle_schedule_key(app: &mut App, backend: &mut Backend, key: KeyEvent) {
    match key.code {
        KeyCode::Left => {
            app.week_start -= chrono::Duration::days(7);
            load_week(app, backend).await;
        }
        KeyCode::Right => {
            app.week_start += chrono::Duration::days(7);
            load_week(app, backend).await;
        }
        KeyCode::Up => app.grid_scroll.scroll_by(-1, grid_rows(app), grid_visible(app)),
        KeyCode::Down => app.grid_scroll.scroll_by(1, grid_rows(app), grid_visible(app)),
        KeyCode::Char('c') => {
            if !app.calendars.is_empty() {
                let next = app
                    .active_calendar
                    .map_or(0, |i| (i + 1) % app.calendars.len());
                app.active_calendar = Some(next);
                load_week(app, backend).await;
            }
        }
        KeyCode::Char('r') => load_week(app, backend).await,
        KeyCode::Enter => submit_pending_block(app, backend).await,
        KeyCode::Esc => {
            app.selection.clear();
        }
        _ => {}
    }
}

async fn handle_appointments_key(app: &mut App, backend: &mut Backend, key: KeyEvent) {
    match key.code {
        KeyCode::Up => {
            app.appointment_cursor = app.appointment_cursor.saturating_sub(1);
        }
        KeyCode::Down => {
            if app.appointment_cursor + 1 < app.appointments.len() {
                app.appointment_cursor += 1;
            }
        }
        KeyCode::Enter => open_meeting(app, backend).await,
        KeyCode::Char('r') => load_appointments(app, backend).await,
        _ => {}
    }
}

async fn handle_meeting_key(app: &mut App, backend: &mut Backend, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.screen = Screen::Appointments;
        }
        KeyCode::Backspace => {
            app.chat_input.pop();
        }
        KeyCode::Enter => send_chat(app, backend).await,
        KeyCode::Char(c) => app.chat_input.push(c),
        _ => {}
    }
}

async fn handle_admin_key(app: &mut App, backend: &mut Backend, key: KeyEvent) {
    if app.assigning_calendar {
        match key.code {
            KeyCode::Up => app.calendar_cursor = app.calendar_cursor.saturating_sub(1),
            KeyCode::Down => {
                if app.calendar_cursor + 1 < app.calendars.len() {
                    app.calendar_cursor += 1;
                }
            }
            KeyCode::Enter => assign_calendar(app, backend).await,
            KeyCode::Esc => app.assigning_calendar = false,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Up => app.user_cursor = app.user_cursor.saturating_sub(1),
        KeyCode::Down => {
            if app.user_cursor + 1 < app.users.len() {
                app.user_cursor += 1;
            }
        }
        KeyCode::Char('a') => {
            if !app.calendars.is_empty() && app.user_cursor < app.users.len() {
                app.assigning_calendar = true;
                app.calendar_cursor = 0;
            }
        }
        KeyCode::Char('r') => load_users(app, backend).await,
        _ => {}
    }
}

fn grid_rows(app: &App) -> usize {
    app.grid_geometry
        .as_ref()
        .map_or(0, |geometry| geometry.rows.len())
}

fn grid_visible(app: &App) -> usize {
    app.grid_geometry
        .as_ref()
        .map_or(1, |geometry| usize::from(geometry.area.height).max(1))
}

// === Backend actions ===

async fn sign_in(app: &mut App, backend: &mut Backend, config: &Config) {
    let (email, password) = match app.login.credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            app.login.error = Some(err.to_string());
            return;
        }
    };

    let anonymous = match ApiClient::anonymous(config) {
        Ok(client) => client,
        Err(err) => {
            app.login.error = Some(format!("Client error: {err}"));
            return;
        }
    };

    match anonymous.login(&email, &password).await {
        Ok(response) => {
            app.login.password.clear();
            app.login.error = None;
            if let Err(err) = save_api_token(&response.token) {
                logging::warn(format!("Could not persist token: {err}"));
            }
            let session = AuthSession::new(response.token, response.user);
            match ApiClient::with_token(config, session.token()) {
                Ok(client) => {
                    app.session = Some(session);
                    app.screen = Screen::Schedule;
                    connect(app, backend, config, client).await;
                }
                Err(err) => {
                    app.login.error = Some(format!("Client error: {err}"));
                }
            }
        }
        Err(err) => {
            app.login.error = Some(format!("Sign-in failed: {err}"));
        }
    }
}

/// Load the signed-in workspace and start the notification stream.
async fn connect(app: &mut App, backend: &mut Backend, config: &Config, client: ApiClient) {
    if config.notifications_enabled() {
        backend.notifications = Some(notifications::subscribe(
            client.clone(),
            config.notification_reconnect_delay(),
        ));
    }
    let api = client.clone();
    backend.client = Some(client);

    match api.list_calendars().await {
        Ok(calendars) => {
            app.active_calendar = pick_calendar(&calendars, config, app.session.as_ref());
            app.calendars = calendars;
        }
        Err(err) => {
            app.status_message = Some(logging::failure("load calendars", &err));
        }
    }

    load_week(app, backend).await;
    load_appointments(app, backend).await;
    load_report(app, backend).await;
    if app.session.as_ref().is_some_and(AuthSession::is_admin) {
        load_users(app, backend).await;
    }
}

/// Prefer the configured calendar, then the signed-in user's own.
fn pick_calendar(
    calendars: &[crate::models::CalendarSummary],
    config: &Config,
    session: Option<&AuthSession>,
) -> Option<usize> {
    if let Some(wanted) = config.default_calendar.as_ref()
        && let Some(index) = calendars
            .iter()
            .position(|c| c.name == *wanted || c.id.to_string() == *wanted)
    {
        return Some(index);
    }
    if let Some(own) = session.and_then(|s| s.user().calendar_id)
        && let Some(index) = calendars.iter().position(|c| c.id == own)
    {
        return Some(index);
    }
    if calendars.is_empty() { None } else { Some(0) }
}

async fn load_week(app: &mut App, backend: &mut Backend) {
    let Some(client) = backend.client.as_ref() else {
        return;
    };
    let Some(calendar) = app.active_calendar() else {
        return;
    };
    match client.week_availability(calendar.id, app.week_start).await {
        Ok(days) => {
            app.set_availability(days);
            app.status_message = None;
        }
        Err(err) => {
            app.status_message = Some(logging::failure("load availability", &err));
        }
    }
}

async fn load_appointments(app: &mut App, backend: &mut Backend) {
    let Some(client) = backend.client.as_ref() else {
        return;
    };
    let calendar_id = app.active_calendar().map(|c| c.id);
    let today = Local::now().date_naive();
    match client.list_appointments(calendar_id, today).await {
        Ok(mut appointments) => {
            appointments.sort_by_key(|a| a.starts_at);
            app.appointments = appointments;
            app.appointment_cursor = 0;
            app.appointment_scroll.reset();
        }
        Err(err) => {
            app.status_message = Some(logging::failure("load appointments", &err));
        }
    }
}

async fn load_report(app: &mut App, backend: &mut Backend) {
    let Some(client) = backend.client.as_ref() else {
        return;
    };
    let today = Local::now().date_naive();
    let from = today - chrono::Duration::days(30);
    match client.report_summary(from, today).await {
        Ok(report) => app.report = Some(report),
        Err(err) => {
            app.status_message = Some(logging::failure("load report", &err));
        }
    }
}

async fn load_users(app: &mut App, backend: &mut Backend) {
    let Some(client) = backend.client.as_ref() else {
        return;
    };
    match client.list_users().await {
        Ok(users) => {
            app.users = users;
            app.user_cursor = 0;
        }
        Err(err) => {
            app.status_message = Some(logging::failure("load users", &err));
        }
    }
}

async fn open_meeting(app: &mut App, backend: &mut Backend) {
    let Some(client) = backend.client.as_ref() else {
        return;
    };
    let Some(appointment) = app.appointments.get(app.appointment_cursor) else {
        return;
    };
    let appointment_id = appointment.id;
    match client.chat_history(appointment_id).await {
        Ok(messages) => {
            app.chat_messages = messages;
            app.chat_input.clear();
            app.chat_scroll.reset();
            app.active_appointment = Some(app.appointment_cursor);
            app.screen = Screen::Meeting;
        }
        Err(err) => {
            app.status_message = Some(logging::failure("load chat", &err));
        }
    }
}

async fn send_chat(app: &mut App, backend: &mut Backend) {
    let body = app.chat_input.trim().to_string();
    if body.is_empty() {
        return;
    }
    let Some(client) = backend.client.as_ref() else {
        return;
    };
    let Some(appointment) = app.active_appointment() else {
        return;
    };
    match client.send_chat(appointment.id, &body).await {
        Ok(message) => {
            app.chat_messages.push(message);
            app.chat_input.clear();
        }
        Err(err) => {
            app.status_message = Some(logging::failure("send message", &err));
        }
    }
}

async fn submit_pending_block(app: &mut App, backend: &mut Backend) {
    let Some(range) = app.pending_range.clone() else {
        return;
    };
    let Some(client) = backend.client.as_ref() else {
        return;
    };
    let Some(calendar) = app.active_calendar() else {
        return;
    };
    let calendar_id = calendar.id;
    match client.create_time_block(calendar_id, &range).await {
        Ok(()) => {
            app.status_message = Some(format!(
                " Blocked {} {} – {}",
                range.date, range.start_time, range.end_time
            ));
            app.selection.clear();
            app.drain_selection_updates();
            load_week(app, backend).await;
        }
        Err(err) => {
            app.status_message = Some(logging::failure("save block", &err));
        }
    }
}

async fn assign_calendar(app: &mut App, backend: &mut Backend) {
    let Some(client) = backend.client.as_ref() else {
        return;
    };
    let (Some(user), Some(calendar)) = (
        app.users.get(app.user_cursor),
        app.calendars.get(app.calendar_cursor),
    ) else {
        return;
    };
    let (user_id, calendar_id, calendar_name) = (user.id, calendar.id, calendar.name.clone());
    match client.assign_calendar(user_id, calendar_id).await {
        Ok(()) => {
            if let Some(user) = app.users.get_mut(app.user_cursor) {
                user.calendar_id = Some(calendar_id);
            }
            app.status_message = Some(format!(" Assigned {calendar_name}"));
            app.assigning_calendar = false;
        }
        Err(err) => {
            app.status_message = Some(logging::failure("assign calendar", &err));
        }
    }
}
