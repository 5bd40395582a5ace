//! Shared time and formatting helpers.

use chrono::{Duration, NaiveDate, NaiveTime};

/// Parse an "HH:MM" block label into a time of day.
#[must_use]
pub fn parse_block_label(label: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(label.trim(), "%H:%M").ok()
}

/// Compute the exclusive end time of a block: its start label plus the
/// block duration, rolling over hour and day boundaries.
#[must_use]
pub fn block_end_time(label: &str, block_minutes: i64) -> Option<String> {
    let start = parse_block_label(label)?;
    let (end, _wrapped_days) = start.overflowing_add_signed(Duration::minutes(block_minutes));
    Some(end.format("%H:%M").to_string())
}

/// Format a date the way the backend expects it ("YYYY-MM-DD").
#[must_use]
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Short weekday + day-of-month column header, e.g. "Mon 12".
#[must_use]
pub fn day_column_header(date: NaiveDate) -> String {
    date.format("%a %d").to_string()
}

/// Render "HH:MM – HH:MM" for a start label and block duration.
#[must_use]
pub fn block_span_label(label: &str, block_minutes: i64) -> String {
    match block_end_time(label, block_minutes) {
        Some(end) => format!("{label} – {end}"),
        None => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_plain_labels() {
        assert_eq!(
            parse_block_label("09:00"),
            NaiveTime::from_hms_opt(9, 0, 0)
        );
        assert_eq!(
            parse_block_label(" 17:45 "),
            NaiveTime::from_hms_opt(17, 45, 0)
        );
        assert_eq!(parse_block_label("not-a-time"), None);
        assert_eq!(parse_block_label("25:00"), None);
    }

    #[test]
    fn end_time_within_the_hour() {
        assert_eq!(block_end_time("09:00", 30).as_deref(), Some("09:30"));
    }

    #[test]
    fn end_time_rolls_over_the_hour() {
        assert_eq!(block_end_time("09:30", 45).as_deref(), Some("10:15"));
        assert_eq!(block_end_time("09:50", 20).as_deref(), Some("10:10"));
    }

    #[test]
    fn end_time_rolls_over_midnight() {
        assert_eq!(block_end_time("23:30", 45).as_deref(), Some("00:15"));
    }

    #[test]
    fn iso_date_formatting() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(format_iso_date(date), "2026-03-09");
    }
}
