use super::error::TaskError;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Default width of the "due soon" window in hours
pub const DEFAULT_DUE_SOON_HOURS: i64 = 24;

/// Local date-time layouts accepted for due dates (browser date-time input style)
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Due state of a task relative to the current time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue,
    DueSoon,
    Normal,
}

impl DueStatus {
    /// Badge text shown next to a task
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Overdue => "OVERDUE",
            Self::DueSoon => "DUE SOON",
            Self::Normal => "DUE",
        }
    }
}

/// Classify a due instant: overdue when strictly in the past, due soon when
/// inside `[now, now + window)`, normal otherwise.
pub fn classify(due: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> DueStatus {
    if due < now {
        return DueStatus::Overdue;
    }
    // A window past the end of time covers every future instant
    match now.checked_add_signed(window) {
        Some(end) if due >= end => DueStatus::Normal,
        _ => DueStatus::DueSoon,
    }
}

/// Parse user-entered due date text.
///
/// Accepts RFC 3339, local date-times (`2025-05-08T15:00`, `2025-05-08 15:00:30`)
/// and bare dates, which are taken as UTC midnight.
pub fn parse_due_date(text: &str) -> Result<DateTime<Utc>, TaskError> {
    let trimmed = text.trim();
    let invalid = || TaskError::InvalidDueDate(text.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            // DST gaps have no local mapping; folds take the earlier instant
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc))
                .ok_or_else(invalid);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    Err(invalid())
}

/// Normalized storage form of a due date (UTC, millisecond precision)
pub fn format_due_date(due: DateTime<Utc>) -> String {
    due.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Due date in local time for display
pub fn format_due_local(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Due date in the layout the input form expects, used to prefill it
pub fn due_input_value(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format("%Y-%m-%dT%H:%M").to_string()
}
