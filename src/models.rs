//! Wire types shared between the API client, the notification stream, and
//! the TUI.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// === Auth ===

#[derive(Debug, Serialize, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Provider,
    Assistant,
}

impl UserRole {
    /// Short label used in tables and the header.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Provider => "provider",
            UserRole::Assistant => "assistant",
        }
    }
}

// === Appointments ===

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Appointment {
    pub id: Uuid,
    pub calendar_id: Uuid,
    pub patient: Patient,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    CheckedIn,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Short label used in list rows.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::CheckedIn => "checked in",
            AppointmentStatus::InProgress => "in progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no-show",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

// === Calendars & availability ===

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CalendarSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    pub timezone: String,
}

/// One day column of the schedule grid: the ordered start-time labels a
/// provider can be booked at, plus the slot duration they share.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub blocks: Vec<String>,
    pub block_minutes: i64,
}

/// A user-drawn contiguous span of blocks, as posted to the backend.
///
/// `end_time` is exclusive: the last block's label plus the block duration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BlockRange {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub reason: String,
}

/// Marker distinguishing drag-drawn blocks from ranges derived from
/// appointments.
pub const MANUAL_BLOCK_REASON: &str = "manual-block";

// === Chat ===

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub sender_name: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub from_patient: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct SendChatRequest {
    pub body: String,
}

// === Notifications ===

/// Server-sent events pushed over the notification stream.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum NotificationEvent {
    #[serde(rename = "appointment.created")]
    AppointmentCreated { appointment: Appointment },
    #[serde(rename = "appointment.updated")]
    AppointmentUpdated { appointment: Appointment },
    #[serde(rename = "appointment.cancelled")]
    AppointmentCancelled { appointment_id: Uuid },
    #[serde(rename = "chat.message")]
    ChatMessage { message: ChatMessage },
    #[serde(rename = "ping")]
    Ping,
}

// === Admin ===

#[derive(Debug, Serialize, Clone)]
pub struct AssignCalendarRequest {
    pub user_id: Uuid,
    pub calendar_id: Uuid,
}

// === Reports ===

#[derive(Debug, Deserialize, Clone)]
pub struct ReportSummary {
    pub total_appointments: u32,
    pub completed: u32,
    pub cancelled: u32,
    pub no_shows: u32,
    pub average_duration_minutes: f64,
    pub per_day: Vec<DailyCount>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn notification_events_deserialize_by_tag() {
        let event: NotificationEvent =
            serde_json::from_str(r#"{"type":"appointment.cancelled","appointment_id":"7f4df4a2-6f0b-4f3e-9c3a-0a9b6f1d2e33"}"#)
                .unwrap();
        assert!(matches!(
            event,
            NotificationEvent::AppointmentCancelled { .. }
        ));

        let event: NotificationEvent = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(event, NotificationEvent::Ping));
    }

    #[test]
    fn block_range_serializes_flat() {
        let range = BlockRange {
            date: "2026-03-09".to_string(),
            start_time: "09:00".to_string(),
            end_time: "10:30".to_string(),
            reason: MANUAL_BLOCK_REASON.to_string(),
        };
        let json = serde_json::to_value(&range).unwrap();
        assert_eq!(json["date"], "2026-03-09");
        assert_eq!(json["start_time"], "09:00");
        assert_eq!(json["end_time"], "10:30");
        assert_eq!(json["reason"], "manual-block");
    }
}
