//! Application state for the Cura TUI.

use std::sync::mpsc::{Receiver, Sender, channel};

use chrono::{Datelike, Duration, Local, NaiveDate};
use ratatui::layout::Rect;
use thiserror::Error;

use crate::config::Config;
use crate::models::{
    Appointment, BlockRange, CalendarSummary, ChatMessage, DayAvailability, ReportSummary, User,
};
use crate::session::AuthSession;
use crate::tui::scrolling::{ListScroll, MouseScrollState};
use crate::tui::selection::BlockSelection;
use crate::utils::parse_block_label;

// === Types ===

/// Top-level screens of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Schedule,
    Appointments,
    Meeting,
    Admin,
    Reports,
}

impl Screen {
    /// Short label used in the header tabs.
    pub fn label(self) -> &'static str {
        match self {
            Screen::Login => "LOGIN",
            Screen::Schedule => "SCHEDULE",
            Screen::Appointments => "APPOINTMENTS",
            Screen::Meeting => "MEETING",
            Screen::Admin => "ADMIN",
            Screen::Reports => "REPORTS",
        }
    }
}

/// Errors that can occur while submitting the login form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginFormError {
    #[error("Email is required")]
    EmptyEmail,
    #[error("Password is required")]
    EmptyPassword,
    #[error("'{0}' does not look like an email address")]
    InvalidEmail(String),
}

/// Login form state.
#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus_password: bool,
    pub error: Option<String>,
}

impl LoginForm {
    /// Validate the form and hand back the trimmed credentials.
    pub fn credentials(&self) -> Result<(String, String), LoginFormError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(LoginFormError::EmptyEmail);
        }
        if !email.contains('@') {
            return Err(LoginFormError::InvalidEmail(email.to_string()));
        }
        if self.password.is_empty() {
            return Err(LoginFormError::EmptyPassword);
        }
        Ok((email.to_string(), self.password.clone()))
    }
}

/// Geometry of the schedule grid recorded at render time, used to map a
/// terminal (column, row) back to a (day, block) cell.
#[derive(Debug, Clone)]
pub struct GridGeometry {
    /// Inner area holding only the day-column cells.
    pub area: Rect,
    pub days: Vec<NaiveDate>,
    /// Row labels top to bottom, before the scroll offset.
    pub rows: Vec<String>,
    pub row_offset: usize,
    pub col_width: u16,
}

impl GridGeometry {
    /// Resolve a terminal position to the cell under it.
    #[must_use]
    pub fn cell_at(&self, column: u16, row: u16) -> Option<(NaiveDate, &str)> {
        if column < self.area.x
            || column >= self.area.x + self.area.width
            || row < self.area.y
            || row >= self.area.y + self.area.height
        {
            return None;
        }
        if self.col_width == 0 {
            return None;
        }
        let day_index = usize::from((column - self.area.x) / self.col_width);
        let day = *self.days.get(day_index)?;
        let row_index = usize::from(row - self.area.y) + self.row_offset;
        let label = self.rows.get(row_index)?;
        Some((day, label.as_str()))
    }
}

// === App State ===

/// Global UI state for the TUI.
pub struct App {
    pub screen: Screen,
    pub session: Option<AuthSession>,
    pub login: LoginForm,
    pub status_message: Option<String>,
    pub should_quit: bool,

    // Calendars & schedule
    pub calendars: Vec<CalendarSummary>,
    pub active_calendar: Option<usize>,
    pub week_start: NaiveDate,
    pub availability: Vec<DayAvailability>,
    pub selection: BlockSelection,
    range_rx: Receiver<Option<BlockRange>>,
    /// Most recently emitted range, shown in the footer and posted on
    /// confirm.
    pub pending_range: Option<BlockRange>,
    pub grid_geometry: Option<GridGeometry>,
    pub grid_scroll: ListScroll,

    // Appointments
    pub appointments: Vec<Appointment>,
    pub appointment_cursor: usize,
    pub appointment_scroll: ListScroll,
    /// List rows shown last frame, for wheel-scroll clamping.
    pub appointment_view_rows: usize,
    pub mouse_scroll: MouseScrollState,

    // Meeting companion
    pub active_appointment: Option<usize>,
    pub chat_messages: Vec<ChatMessage>,
    pub chat_input: String,
    pub chat_scroll: ListScroll,
    pub chat_view_rows: usize,

    // Admin
    pub users: Vec<User>,
    pub user_cursor: usize,
    pub assigning_calendar: bool,
    pub calendar_cursor: usize,

    // Reports
    pub report: Option<ReportSummary>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let (range_tx, range_rx): (Sender<Option<BlockRange>>, _) = channel();
        let selection = BlockSelection::new(Vec::new(), 30).on_change(move |range| {
            let _ = range_tx.send(range);
        });

        Self {
            screen: Screen::Login,
            session: None,
            login: LoginForm::default(),
            status_message: None,
            should_quit: false,
            calendars: Vec::new(),
            active_calendar: None,
            week_start: start_of_week(Local::now().date_naive(), config.week_starts_sunday()),
            availability: Vec::new(),
            selection,
            range_rx,
            pending_range: None,
            grid_geometry: None,
            grid_scroll: ListScroll::default(),
            appointments: Vec::new(),
            appointment_cursor: 0,
            appointment_scroll: ListScroll::default(),
            appointment_view_rows: 0,
            mouse_scroll: MouseScrollState::new(),
            active_appointment: None,
            chat_messages: Vec::new(),
            chat_input: String::new(),
            chat_scroll: ListScroll::default(),
            chat_view_rows: 0,
            users: Vec::new(),
            user_cursor: 0,
            assigning_calendar: false,
            calendar_cursor: 0,
            report: None,
        }
    }

    /// Drain the selection controller's emissions into `pending_range`.
    /// Called once per event-loop tick, after input handling.
    pub fn drain_selection_updates(&mut self) {
        while let Ok(range) = self.range_rx.try_recv() {
            self.pending_range = range;
        }
    }

    /// The calendar currently shown on the schedule screen.
    #[must_use]
    pub fn active_calendar(&self) -> Option<&CalendarSummary> {
        self.active_calendar.and_then(|i| self.calendars.get(i))
    }

    /// The appointment open on the meeting screen.
    #[must_use]
    pub fn active_appointment(&self) -> Option<&Appointment> {
        self.active_appointment
            .and_then(|i| self.appointments.get(i))
    }

    /// Install freshly fetched availability and rebuild the selection
    /// controller's block list from it.
    pub fn set_availability(&mut self, days: Vec<DayAvailability>) {
        let block_minutes = days.first().map_or(30, |d| d.block_minutes);
        self.selection
            .reset_blocks(ordered_block_union(&days), block_minutes);
        self.availability = days;
        self.pending_range = None;
        self.grid_scroll.reset();
    }

    /// Whether `(day, time)` can be booked on the shown calendar.
    #[must_use]
    pub fn is_block_available(&self, day: NaiveDate, time: &str) -> bool {
        self.availability
            .iter()
            .any(|d| d.date == day && d.blocks.iter().any(|b| b == time))
    }

    /// Replace or insert an appointment received over the notification
    /// stream.
    pub fn upsert_appointment(&mut self, appointment: Appointment) {
        match self
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment.id)
        {
            Some(existing) => *existing = appointment,
            None => {
                self.appointments.push(appointment);
                self.appointments.sort_by_key(|a| a.starts_at);
            }
        }
    }

    pub fn remove_appointment(&mut self, id: uuid::Uuid) {
        if let Some(index) = self.appointments.iter().position(|a| a.id == id) {
            self.appointments.remove(index);
            // Keep the cursor on the same entry when an earlier row goes.
            if self.appointment_cursor > index {
                self.appointment_cursor -= 1;
            }
            if self.appointment_cursor >= self.appointments.len() {
                self.appointment_cursor = self.appointments.len().saturating_sub(1);
            }
            // Keep the meeting pane pointed at the same appointment.
            match self.active_appointment {
                Some(active) if active == index => {
                    self.active_appointment = None;
                    if self.screen == Screen::Meeting {
                        self.screen = Screen::Appointments;
                    }
                }
                Some(active) if active > index => {
                    self.active_appointment = Some(active - 1);
                }
                _ => {}
            }
        }
    }
}

// === Helpers ===

/// Snap a date back to the start of its week.
#[must_use]
pub fn start_of_week(date: NaiveDate, starts_sunday: bool) -> NaiveDate {
    let days_from_start = if starts_sunday {
        date.weekday().num_days_from_sunday()
    } else {
        date.weekday().num_days_from_monday()
    };
    date - Duration::days(i64::from(days_from_start))
}

/// Merge each day's labels into one ordered row list for the grid, sorted
/// by time of day with duplicates collapsed.
#[must_use]
pub fn ordered_block_union(days: &[DayAvailability]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for day in days {
        for block in &day.blocks {
            if !labels.iter().any(|l| l == block) {
                labels.push(block.clone());
            }
        }
    }
    labels.sort_by_key(|label| parse_block_label(label));
    labels
}
