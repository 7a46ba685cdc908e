use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Basic-format UTC timestamp as used by iCalendar (`20261019T143000Z`).
pub fn to_ical_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Human readable form used in mail bodies.
pub fn to_display(dt: DateTime<Utc>) -> String {
    dt.format("%A, %d %B %Y at %H:%M UTC").to_string()
}
